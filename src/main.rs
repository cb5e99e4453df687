use std::io::Write;
use std::{
    env,
    fs::{self, OpenOptions},
};

use anyhow::Context;
use geniusfactory::{
    block::{get_block, sequence, serialize_block},
    qbank::get_questions,
    ApiClient, Config, FileStore, KeyValueStore, ProgressStore,
};

const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";
const DEFAULT_OUTPUT_DIR: &str = "output/blocos";

struct Args {
    block_id: String,
    output_dir: String,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> anyhow::Result<Args> {
    let block_id = args.next().context("block_id is required")?;
    let output_dir = args.next().unwrap_or(DEFAULT_OUTPUT_DIR.to_string());

    Ok(Args {
        block_id,
        output_dir,
    })
}

/// Where the learner left off in this block, from the local store.
fn resume_note(store: &dyn KeyValueStore, block_id: &str, page_count: usize) -> Option<String> {
    let position = ProgressStore::new(store).position(block_id)?;
    (position < page_count).then(|| format!("resume at page {} of {}", position + 1, page_count))
}

fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    pretty_env_logger::init();

    let args = match parse_args(env::args().skip(1)) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("Usage: cargo run <block_id> [output_dir]");
            return Err(e);
        }
    };

    let config = Config::from_env();
    let api = ApiClient::from_config(&config);

    let block = get_block(&api, &args.block_id)
        .context(format!("could not fetch block {}", args.block_id))?;
    let pages = sequence(&block.activities);
    if pages.is_empty() {
        anyhow::bail!("block {} has no pages", block.id);
    }

    let question_ids = block.question_ids();
    let questions = if question_ids.is_empty() {
        vec![]
    } else {
        get_questions(&api, &question_ids).context("failed to fetch block questions")?
    };

    let content =
        serialize_block(&block, &pages, &questions).context("failed to serialize block")?;

    fs::create_dir_all(&args.output_dir).context("failed to create output directory")?;
    let file_path = format!("{}/{}.md", args.output_dir, block.id);
    let mut file = OpenOptions::new()
        .create(true)
        .truncate(true)
        .write(true)
        .open(&file_path)
        .context(format!("failed to open {}", file_path))?;
    write!(file, "{}", content).context("failed to write block")?;

    println!(
        "exported {BOLD}{}{RESET} ({} pages) to {BOLD}{}{RESET}",
        block.title,
        pages.len(),
        file_path
    );

    let store = FileStore::new(&config.store_path);
    if let Some(note) = resume_note(&store, &block.id, pages.len()) {
        println!("{}", note);
    }

    Ok(())
}
