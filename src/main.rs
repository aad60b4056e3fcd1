mod db;
mod intel;
mod minimax;
mod parser;
mod research;
mod script;

use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Result};
use clap::{CommandFactory, Parser};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;

use crate::db::Store;
use crate::minimax::MiniMax;
use crate::research::Rtrvr;
use crate::script::VideoScript;

const DEFAULT_SENDER: &str = "Sarah from ProspectClip";
const DEFAULT_PRODUCT: &str = "ProspectClip — AI-generated personalized sales videos at scale. \
Upload a prospect list and ProspectClip researches each prospect, writes a personalized script, \
generates AI narration and scene visuals, and delivers finished narrated video presentations \
ready to embed in outreach emails. 3-5x reply rates vs text email. Zero recording needed.";

#[derive(Parser)]
#[command(
    name = "prospectclip",
    about = "Research a prospect by email, store to DB, generate sales pitch + 3-scene video script"
)]
struct Cli {
    /// Prospect email (e.g. xyz@minimax.com)
    email: Option<String>,

    /// Sender name shown in pitch and script
    #[arg(long, default_value = DEFAULT_SENDER)]
    sender: String,

    /// Product description to pitch
    #[arg(long, default_value = DEFAULT_PRODUCT)]
    product: String,

    /// Save full results to a JSON file
    #[arg(long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// List all stored prospects
    #[arg(long)]
    list: bool,

    /// Show stored data for a specific email
    #[arg(long, value_name = "EMAIL")]
    show: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();
    let store = Store::open(db::DB_PATH)?;

    if cli.list {
        return cmd_list(&store);
    }
    if let Some(email) = cli.show.as_deref() {
        return cmd_show(&store, email);
    }
    let Some(email) = cli.email.as_deref() else {
        Cli::command().print_help()?;
        std::process::exit(1);
    };

    // Fail on missing credentials before any work begins
    let missing: Vec<&str> = ["RTRVR_API_KEY", "MINIMAX_API_KEY"]
        .into_iter()
        .filter(|key| std::env::var(key).is_err())
        .collect();
    if !missing.is_empty() {
        bail!("missing environment variables: {}", missing.join(", "));
    }

    run(
        &store,
        email,
        &cli.sender,
        &cli.product,
        cli.output.as_deref(),
    )
    .await
}

/// Full pipeline: research → summarize → pitch → persist → script → persist.
async fn run(
    store: &Store,
    email: &str,
    sender: &str,
    product: &str,
    output: Option<&Path>,
) -> Result<()> {
    let rtrvr = Rtrvr::from_env()?;
    let minimax = MiniMax::from_env()?;

    let pb = spinner(format!("[1/4] Researching {email} via rtrvr.ai ..."));
    let research_data = rtrvr.research(email).await?;
    pb.finish_and_clear();
    println!("[1/4] Research complete.");

    let pb = spinner("[2/4] Summarizing research with MiniMax M2.5 ...".into());
    let summary = intel::summarize_research(&minimax, &research_data, email).await?;
    pb.finish_and_clear();
    println!("[2/4] Summary complete.");

    let pb = spinner("[3/4] Generating personalized pitch ...".into());
    let pitch = intel::generate_pitch(&minimax, &summary, product).await?;
    pb.finish_and_clear();
    println!("[3/4] Pitch generated.");

    let prospect_id = store.save_prospect(email, &research_data, &summary, &pitch)?;
    println!("[db] Prospect stored (id={prospect_id})");

    let pb = spinner("[4/4] Generating video script with MiniMax M2.5 ...".into());
    let video = script::generate(&minimax, &summary, email, sender, product).await?;
    pb.finish_and_clear();
    println!("[4/4] Video script generated.");

    let script_id = store.save_script(prospect_id, email, sender, product, &video)?;
    println!("[db] Script stored (id={script_id})");

    print_banner("PROSPECT SUMMARY");
    println!("{summary}");
    print_banner("SALES PITCH (text email)");
    println!("{pitch}");
    print_script(&video);

    if let Some(path) = output {
        let results = RunOutput {
            email,
            sender,
            product,
            prospect_id,
            script_id,
            summary: &summary,
            pitch: &pitch,
            script: &video,
        };
        serde_json::to_writer_pretty(File::create(path)?, &results)?;
        println!("\nResults saved to {}", path.display());
    }

    Ok(())
}

/// Everything one run produced; the `script` field keeps the camelCase wire
/// shape so it can feed a voice/image pipeline directly.
#[derive(Serialize)]
struct RunOutput<'a> {
    email: &'a str,
    sender: &'a str,
    product: &'a str,
    prospect_id: i64,
    script_id: i64,
    summary: &'a str,
    pitch: &'a str,
    script: &'a VideoScript,
}

// ── Display ──

fn cmd_list(store: &Store) -> Result<()> {
    let rows = store.list_prospects()?;
    if rows.is_empty() {
        println!("No prospects in database yet.");
        return Ok(());
    }

    println!(
        "\n{:<5} {:<35} {:<22} {:<22} CREATED",
        "ID", "EMAIL", "NAME", "COMPANY"
    );
    println!("{}", "-".repeat(105));
    for r in &rows {
        println!(
            "{:<5} {:<35} {:<22} {:<22} {}",
            r.id,
            truncate(&r.email, 35),
            truncate(r.name.as_deref().unwrap_or(""), 22),
            truncate(r.company_name.as_deref().unwrap_or(""), 22),
            r.created_at
        );
    }
    println!("\n{} prospects", rows.len());
    Ok(())
}

fn cmd_show(store: &Store, email: &str) -> Result<()> {
    let Some(p) = store.get_prospect(email)? else {
        println!("No prospect found for: {email}");
        return Ok(());
    };

    println!("\n{}", "=".repeat(60));
    println!("PROSPECT: {email}");
    println!("{}", "=".repeat(60));
    field("id", &p.id.to_string());
    field("name", p.name.as_deref().unwrap_or(""));
    field("title", p.title.as_deref().unwrap_or(""));
    field("seniority", p.seniority.as_deref().unwrap_or(""));
    field("company_name", p.company_name.as_deref().unwrap_or(""));
    field("company_domain", p.company_domain.as_deref().unwrap_or(""));
    field("industry", p.industry.as_deref().unwrap_or(""));
    field("company_what", p.company_what.as_deref().unwrap_or(""));
    field("company_size", p.company_size.as_deref().unwrap_or(""));
    field("company_funding", p.company_funding.as_deref().unwrap_or(""));
    field("company_hq", p.company_hq.as_deref().unwrap_or(""));
    field("recent_news", p.recent_news.as_deref().unwrap_or(""));
    field("pain_points", &join_list(&p.pain_points));
    field("talking_points", &join_list(&p.talking_points));
    field("created_at", &p.created_at);
    field("updated_at", &p.updated_at);

    println!("\n--- SUMMARY ---");
    println!("{}", p.summary.as_deref().unwrap_or("(none)"));
    println!("\n--- PITCH ---");
    println!("{}", p.pitch.as_deref().unwrap_or("(none)"));

    let scripts = store.scripts_for(email)?;
    if !scripts.is_empty() {
        println!("\n--- VIDEO SCRIPTS ({} stored) ---", scripts.len());
        for s in &scripts {
            println!(
                "\n  Script #{} | sender: {} | {}",
                s.id,
                s.sender.as_deref().unwrap_or(""),
                s.created_at
            );
            for scene in s.scenes.items() {
                println!(
                    "    Scene {}: {}",
                    scene.scene_number,
                    truncate(&scene.narration, 80)
                );
            }
        }
    }
    Ok(())
}

fn print_script(video: &VideoScript) {
    println!("\n{}", "=".repeat(70));
    println!("VIDEO SCRIPT ({} SCENES)", video.scenes.len());
    println!("{}", "=".repeat(70));
    for scene in &video.scenes {
        println!(
            "\n--- Scene {} ({}s) ---",
            scene.scene_number, scene.duration_seconds
        );
        println!("NARRATION  : {}", scene.narration);
        println!("VISUAL     : {}", scene.visual_prompt);
    }
    let words = video.full_narration.split_whitespace().count();
    println!("\nTotal: ~{}s  |  {} words", video.total_seconds(), words);
    println!("\nFULL NARRATION:\n{}", video.full_narration);
    println!("{}", "=".repeat(70));
}

fn print_banner(title: &str) {
    println!("\n{}", "=".repeat(70));
    println!("{title}");
    println!("{}", "=".repeat(70));
}

fn field(key: &str, value: &str) {
    println!("  {key:<20}: {value}");
}

fn join_list(list: &db::JsonList<String>) -> String {
    match list {
        db::JsonList::Items(items) => items.join("; "),
        db::JsonList::Raw(raw) => raw.clone(),
    }
}

fn spinner(msg: String) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    pb.set_message(msg);
    pb.enable_steady_tick(Duration::from_millis(120));
    pb
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max).collect();
        format!("{}...", truncated)
    }
}
