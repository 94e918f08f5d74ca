/*!
 * starstat CLI - scan a catalog region and print per-planet statistics
 */

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::{debug, error, warn};

use starstat::{
    catalog::short_type,
    config::{FetchConfig, LogLevel},
    error::{Error, Result},
    logging, CacheStore, CatalogSource, EdsmClient, RateController, Region, RegionQueryEngine,
    Vec3, MAX_REGION_EDGE,
};

/// Consecutive systems with no body data before we probe whether the
/// catalog is throttling us rather than genuinely missing records.
const EMPTY_RESULT_LIMIT: u32 = 20;

#[derive(Parser)]
#[command(name = "starstat")]
#[command(
    version,
    about = "Scan a star catalog region for planet statistics, with chunked disk caching",
    long_about = None
)]
struct Cli {
    /// Region center as "x,y,z" catalog coordinates
    #[arg(
        long,
        value_name = "X,Y,Z",
        value_parser = parse_center,
        default_value = "0,0,0",
        global = true
    )]
    center: Vec3,

    /// Region edge length in catalog units
    #[arg(long, default_value = "200", global = true)]
    size: f64,

    /// Cache directory (default: per-user cache dir)
    #[arg(long, value_name = "DIR", global = true)]
    cache_dir: Option<PathBuf>,

    /// Catalog base URL
    #[arg(long, value_name = "URL", global = true)]
    base_url: Option<String>,

    /// Floor of the inter-call delay in milliseconds
    #[arg(long, value_name = "MS", global = true)]
    delay_ms: Option<u64>,

    /// Back-off retries before declaring the catalog locked
    #[arg(long, value_name = "N", global = true)]
    retry_limit: Option<u32>,

    /// Load configuration from a TOML file (flags override it)
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Log level
    #[arg(long, value_enum, global = true)]
    log_level: Option<LogLevel>,

    /// Log file path (default: stderr)
    #[arg(long, value_name = "FILE", global = true)]
    log_file: Option<PathBuf>,

    /// Verbose logging (shorthand for --log-level debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the primary-star type of every system in the region
    StarTypes,

    /// Per-planet table over single-star systems:
    /// star type, star temperature, distance, terraformable flag
    Terraform,

    /// Like terraform, but print only terraforming candidates
    Candidates,
}

impl Cli {
    fn to_config(&self) -> Result<FetchConfig> {
        let mut config = match &self.config {
            Some(path) => FetchConfig::from_file(path)?,
            None => FetchConfig::default(),
        };

        if let Some(dir) = &self.cache_dir {
            config.cache_dir = dir.clone();
        }
        if let Some(url) = &self.base_url {
            config.base_url = url.clone();
        }
        if let Some(ms) = self.delay_ms {
            config.base_delay_ms = ms;
        }
        if let Some(n) = self.retry_limit {
            config.retry_limit = n;
        }
        if let Some(level) = self.log_level {
            config.log_level = level;
        }
        if let Some(file) = &self.log_file {
            config.log_file = Some(file.clone());
        }
        config.verbose = config.verbose || self.verbose;

        config.validate()?;
        Ok(config)
    }
}

fn parse_center(s: &str) -> std::result::Result<Vec3, String> {
    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    if parts.len() != 3 {
        return Err(format!("expected \"x,y,z\", got \"{s}\""));
    }
    let mut axes = [0.0f64; 3];
    for (axis, part) in axes.iter_mut().zip(&parts) {
        *axis = part
            .parse()
            .map_err(|_| format!("invalid coordinate \"{part}\""))?;
    }
    Ok(Vec3::new(axes[0], axes[1], axes[2]))
}

fn main() {
    let cli = Cli::parse();

    let config = match cli.to_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(e.exit_code());
        }
    };

    if let Err(e) = logging::init_logging(&config) {
        eprintln!("Error: {e}");
        std::process::exit(e.exit_code());
    }

    if let Err(e) = run(&cli, &config) {
        error!(cause = %e, "run failed");
        eprintln!("Error: {e}");
        std::process::exit(e.exit_code());
    }
}

fn run(cli: &Cli, config: &FetchConfig) -> Result<()> {
    if cli.size > MAX_REGION_EDGE {
        warn!(
            size = cli.size,
            max = MAX_REGION_EDGE,
            "region edge exceeds the advisory maximum; expect a long scan"
        );
    }

    let cache = CacheStore::open(&config.cache_dir)?;
    let client = EdsmClient::new(&config.base_url)?;
    let pacing = RateController::new(config.base_delay());
    let engine = RegionQueryEngine::new(&client, &cache, &pacing, config.retry_limit);

    let region = Region::from_center(cli.center, Vec3::ONE.scale(cli.size));

    match cli.command {
        Command::StarTypes => star_types(&engine, &region),
        Command::Terraform => planet_table(&engine, &region, false),
        Command::Candidates => planet_table(&engine, &region, true),
    }
}

fn star_types<S: CatalogSource>(engine: &RegionQueryEngine<S>, region: &Region) -> Result<()> {
    let systems = engine.query_region(region)?;
    for system in systems {
        if let Some(star_type) = system
            .primary_star
            .as_ref()
            .and_then(|s| s.star_type.as_deref())
        {
            println!("{star_type}");
        }
    }
    Ok(())
}

fn planet_table<S: CatalogSource>(
    engine: &RegionQueryEngine<S>,
    region: &Region,
    candidates_only: bool,
) -> Result<()> {
    let systems = engine.query_region(region)?;

    if candidates_only {
        println!("StarType\tStarTemp\tDistance");
    } else {
        println!("StarType\tStarTemp\tDistance\tTerraformable");
    }

    let mut empty_streak = 0u32;
    for system in &systems {
        let info = match engine.system_info(&system.name) {
            Ok(info) => {
                empty_streak = 0;
                info
            }
            Err(Error::SystemNotFound { .. }) => {
                empty_streak += 1;
                debug!(system = %system.name, streak = empty_streak, "no body data for system");
                confirm_not_locked(engine, &mut empty_streak)?;
                continue;
            }
            Err(e) => return Err(e),
        };

        // Temperature classing only makes sense for single-star systems
        if info.star_count() != 1 {
            continue;
        }
        let stars = info.stars();
        let Some(star) = stars.first() else {
            continue;
        };

        let star_sub_type = star.sub_type.as_deref().unwrap_or("?");
        let star_temp = star.surface_temperature.unwrap_or(0.0);

        for planet in info.planets() {
            let candidate = planet.is_terraforming_candidate();
            let distance = planet.distance_to_arrival.unwrap_or(0.0);

            if candidates_only {
                if candidate {
                    println!("{star_sub_type}\t{star_temp:.6}\t{distance:.6}");
                }
            } else {
                let flag = if candidate { "T" } else { "F" };
                println!(
                    "{}\t{star_temp:.6}\t{distance:.6}\t{flag}",
                    short_type(star_sub_type)
                );
            }
        }
    }

    Ok(())
}

/// After too many consecutive missing-body results, ask the reference
/// probe whether the catalog is throttling us. A dead probe is fatal; a
/// live one resets the streak (the gaps were genuine).
fn confirm_not_locked<S: CatalogSource>(
    engine: &RegionQueryEngine<S>,
    empty_streak: &mut u32,
) -> Result<()> {
    if *empty_streak < EMPTY_RESULT_LIMIT {
        return Ok(());
    }
    if !engine.probe_alive()? {
        return Err(Error::SourceLocked {
            attempts: *empty_streak,
        });
    }
    *empty_streak = 0;
    Ok(())
}
