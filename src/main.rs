//! survivorsim - headless combat core for a survivors-style action game
//!
//! Runs one autopiloted session and prints its report.

use survivorsim::cli;
use survivorsim::headless::run_headless;

fn main() {
    let args = cli::parse_args();

    let result = args.run_config().and_then(|config| {
        let game_config = config.load_game_config()?;
        run_headless(config, game_config)
    });

    match result {
        Ok(report) => {
            println!(
                "Run complete: {} after {:.1}s. Level {}, score {}, {} kills.",
                if report.game_over { "player died" } else { "survived" },
                report.elapsed_secs,
                report.level,
                report.score,
                report.kills
            );
            for (weapon, damage) in &report.damage_by_weapon {
                println!("  {:<14} {:>8.0} damage", weapon, damage);
            }
        }
        Err(e) => {
            eprintln!("Headless run failed: {}", e);
            std::process::exit(1);
        }
    }
}
