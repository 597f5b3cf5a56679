/// 可供隨機挑選的範例專案提示
pub const EXAMPLE_PROMPTS: [&str; 5] = [
    "Build a fitness tracking app with user profiles and workout logs",
    "Create a cryptocurrency dashboard with real-time price updates",
    "Develop a blogging platform with markdown support and image uploads",
    "Build an e-commerce store with payment integration and product filters",
    "Create a note-taking app with rich text support and cloud sync",
];

/// 隨機回傳一個範例提示，可能重複
pub fn suggest_prompt() -> &'static str {
    suggest_prompt_with(&mut fastrand::Rng::new())
}

pub fn suggest_prompt_with(rng: &mut fastrand::Rng) -> &'static str {
    EXAMPLE_PROMPTS[rng.usize(..EXAMPLE_PROMPTS.len())]
}
