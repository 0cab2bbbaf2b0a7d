use clap::Parser;
use market_answer_agent::{
    agent::{Agent, Session},
    config::AgentConfig,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "market-agent")]
#[command(about = "Answer a financial question using live market data", long_about = None)]
struct Cli {
    /// Your financial question in natural language
    query: String,
}

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let config = match AgentConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("Please make sure GROQ_API_KEY and OPENBB_PAT are set (a .env file works).");
            std::process::exit(1);
        }
    };

    let session = match Session::connect(&config) {
        Ok(session) => session,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    info!(query = %cli.query, "Market answer agent starting");

    let agent = Agent::new(session);
    let answer = agent.answer(&cli.query).await;

    if let Some(request) = &answer.request {
        println!("Generated request: {}", request);
    }

    let rule = "-".repeat(50);
    println!("\n{}", rule);
    println!("Final Answer:");
    println!("{}", rule);
    println!("{}", answer.summary);
    println!("{}\n", rule);
}
