use crate::domain::model::{Category, TemplatedPrompt};

/// 將使用者提示包成三個類別的提示，不做任何驗證
pub fn template_prompts(prompt: &str) -> [TemplatedPrompt; 3] {
    Category::ALL.map(|category| template_prompt(category, prompt))
}

pub fn template_prompt(category: Category, prompt: &str) -> TemplatedPrompt {
    TemplatedPrompt {
        category,
        text: format!("{}{}", category.instruction(), prompt),
    }
}
