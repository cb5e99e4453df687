use anyhow::Context;
use geniusfactory::{
    achievements::{get_achievements, group_achievements, Achievement},
    ApiClient, Config,
};

const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    pretty_env_logger::init();

    let config = Config::from_env();
    let api = ApiClient::from_config(&config);

    let achievements = get_achievements(&api).context("could not fetch achievements")?;
    let groups = group_achievements(achievements);

    println!(
        "{BOLD}{}{RESET} of {BOLD}{}{RESET} achievements unlocked\n",
        groups.unlocked, groups.total
    );

    for (category, list) in &groups.by_category {
        println!("{BOLD}{}{RESET}", category.label());
        list.iter().for_each(print_achievement);
        println!();
    }

    if !groups.special.is_empty() {
        println!("{BOLD}Especiais{RESET}");
        groups.special.iter().for_each(print_achievement);
    }

    Ok(())
}

fn print_achievement(achievement: &Achievement) {
    let mark = if achievement.unlocked { "x" } else { " " };
    println!(
        "  [{}] {} (nível {}) - {}",
        mark, achievement.title, achievement.level, achievement.criterion
    );
}
