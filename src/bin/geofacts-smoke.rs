//! 手动冒烟检查：凭据是否齐全、能否真实生成一条趣闻

use std::process::ExitCode;
use std::sync::Arc;

use geofacts::logger::{self, LogConfig};
use geofacts::{AppConfig, FactGenerator, FactOutcome, FactSettings, OpenAIClient};
use tracing::{error, info};

/// 测试坐标（莫斯科）
const TEST_LATITUDE: f64 = 55.7558;
const TEST_LONGITUDE: f64 = 37.6176;

struct ApiCheck {
    success: bool,
    fact: Option<String>,
    tokens_used: Option<u32>,
    error: Option<String>,
}

fn env_lookup(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

async fn check_openai(api_key: String) -> ApiCheck {
    info!("Testing OpenAI API...");

    let model = env_lookup("OPENAI_MODEL")
        .unwrap_or_else(|| geofacts::infrastructure::llm::DEFAULT_MODEL.to_string());
    let base_url = env_lookup("OPENAI_BASE_URL")
        .unwrap_or_else(|| geofacts::infrastructure::llm::DEFAULT_BASE_URL.to_string());
    let client = OpenAIClient::new_with_base_url(api_key, model, base_url);
    let generator = FactGenerator::new(Arc::new(client), FactSettings::default());

    match generator.generate_fact(TEST_LATITUDE, TEST_LONGITUDE).await {
        FactOutcome::Generated(fact) => {
            info!("✅ OpenAI API test successful");
            ApiCheck {
                success: true,
                fact: Some(fact.text().to_string()),
                tokens_used: fact.tokens_used(),
                error: None,
            }
        }
        FactOutcome::Failed(failure) => {
            error!("❌ OpenAI API test failed: {}", failure);
            ApiCheck {
                success: false,
                fact: None,
                tokens_used: None,
                error: Some(failure.to_string()),
            }
        }
    }
}

fn preview(text: &str) -> String {
    text.chars().take(100).collect()
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();
    logger::init("bot_test", LogConfig::from_env());

    info!("Starting comprehensive bot testing...");

    let credentials = AppConfig::credential_status(env_lookup);
    for (name, present) in &credentials {
        if *present {
            info!("✅ {} found", name);
        } else {
            error!("❌ {} missing", name);
        }
    }

    let api = match env_lookup(geofacts::config::OPENAI_API_KEY).filter(|v| !v.trim().is_empty()) {
        Some(key) => check_openai(key.trim().to_string()).await,
        None => ApiCheck {
            success: false,
            fact: None,
            tokens_used: None,
            error: Some("OpenAI client not initialized".to_string()),
        },
    };

    let total = credentials.len() + 1;
    let passed = credentials.iter().filter(|(_, ok)| *ok).count() + usize::from(api.success);
    let rate = passed as f64 / total as f64 * 100.0;
    info!("Testing completed: {}/{} tests passed ({:.1}%)", passed, total, rate);

    let icon = |ok: bool| if ok { "✅" } else { "❌" };

    println!("\n{}", "=".repeat(50));
    println!("BOT TESTING RESULTS");
    println!("{}", "=".repeat(50));

    println!("\nENVIRONMENT VARIABLES:");
    for (name, present) in &credentials {
        println!("  {} {}", icon(*present), name);
    }

    println!("\nAPI TESTS:");
    println!("  {} OpenAI API", icon(api.success));
    match (&api.fact, &api.error) {
        (Some(fact), _) => {
            println!("    Generated fact: {}...", preview(fact));
            match api.tokens_used {
                Some(tokens) => println!("    Tokens used: {}", tokens),
                None => println!("    Tokens used: N/A"),
            }
        }
        (None, Some(err)) => println!("    Error: {}", err),
        (None, None) => println!("    Error: Unknown error"),
    }

    println!("\nSUMMARY:");
    println!("  Tests passed: {}/{}", passed, total);
    println!("  Success rate: {:.1}%", rate);

    if passed == total {
        println!("\n🎉 All tests passed! Bot is ready for deployment.");
        ExitCode::SUCCESS
    } else {
        println!("\n⚠️  Some tests failed. Please check the configuration.");
        ExitCode::FAILURE
    }
}
