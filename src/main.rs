use clap::Parser;
use crew_pilot::config::cli::Command;
use crew_pilot::utils::error::ErrorSeverity;
use crew_pilot::utils::{logger, validation::Validate};
use crew_pilot::{
    suggest_prompt, Category, Cli, CodegenPipeline, GeminiClient, GeneratorConfig, GeneratorError,
    LocalStorage, RunResult,
};
use serde::Serialize;

#[derive(Serialize)]
struct ArtifactReport {
    category: Category,
    path: String,
    success: bool,
    content: String,
}

#[derive(Serialize)]
struct RunReport<'a> {
    summary: &'a str,
    output_dir: Option<&'a str>,
    artifacts: Vec<ArtifactReport>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // 初始化日誌
    logger::init_cli_logger(cli.options.verbose);

    let (prompt, json) = match &cli.command {
        Command::Suggest => {
            println!("{}", suggest_prompt());
            return Ok(());
        }
        // clap 保證 prompt 與 --suggest 至少有一個
        Command::Generate { prompt, json, .. } => {
            let prompt = match prompt {
                Some(prompt) => prompt.clone(),
                None => {
                    let prompt = suggest_prompt().to_string();
                    tracing::info!("🎤 Using suggested prompt: {}", prompt);
                    prompt
                }
            };
            (prompt, *json)
        }
    };

    tracing::info!("Starting crew-pilot");

    let config = match cli.options.resolve() {
        Ok(config) => config,
        Err(e) => exit_with(e),
    };
    tracing::debug!("Resolved config: {:?}", config);

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        exit_with(e);
    }

    match run(config, &prompt, json).await {
        Ok(()) => Ok(()),
        Err(e) => exit_with(e),
    }
}

async fn run(config: GeneratorConfig, prompt: &str, json: bool) -> crew_pilot::Result<()> {
    let storage = LocalStorage::new(&config.output_dir);
    storage.ensure_base_dir().await?;

    let client = GeminiClient::from_config(&config)?;
    let pipeline = CodegenPipeline::new(storage, client, config);

    let result = pipeline.generate(prompt).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report(&result))?);
    } else {
        print_result(&result);
    }

    Ok(())
}

fn report(result: &RunResult) -> RunReport<'_> {
    RunReport {
        summary: &result.summary,
        output_dir: result.output_dir.as_deref(),
        artifacts: result
            .artifacts
            .iter()
            .flatten()
            .map(|artifact| ArtifactReport {
                category: artifact.category,
                path: artifact.path.display().to_string(),
                success: artifact.is_success(),
                content: artifact.content(),
            })
            .collect(),
    }
}

fn print_result(result: &RunResult) {
    println!("{}", result.summary);

    for artifact in result.artifacts.iter().flatten() {
        println!();
        println!("===== {} ({}) =====", artifact.category.label(), artifact.path.display());
        println!("{}", artifact.content());
    }

    if let Some(dir) = &result.output_dir {
        println!();
        println!("📁 Files saved to: {}", dir);
    }

    let failed = result.failed_categories();
    if !failed.is_empty() {
        let names: Vec<String> = failed.iter().map(ToString::to_string).collect();
        eprintln!("⚠️ Generation failed for: {}", names.join(", "));
    }
}

fn exit_with(e: GeneratorError) -> ! {
    tracing::error!(
        "❌ crew-pilot failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

    // 根據錯誤嚴重程度決定退出碼
    let exit_code = match e.severity() {
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code)
}
