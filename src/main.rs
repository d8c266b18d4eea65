use std::io::Write as _;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use skycast_core::{config::API_KEY_ENV, ApiKey, Config, ConfigError, Units};
use skycast_ui::services::{lookup_current_location, quick_check, search_city};
use skycast_ui::{render_report, AppServices, RenderOptions, Session, WeatherReport};
use skycast_weather::WeatherError;
use tokio::io::{AsyncBufReadExt, BufReader};

/// Terminal weather: current conditions, 5-day forecast, trend chart and map pin
#[derive(Parser, Debug)]
#[command(name = "skycast", version)]
struct Args {
    /// OpenWeatherMap API key. Overrides the config file.
    #[arg(long, env = API_KEY_ENV, hide_env_values = true)]
    api_key: Option<String>,

    /// Config file (default: <config dir>/skycast/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Unit system: metric, imperial or standard. Overrides the config file.
    #[arg(long)]
    units: Option<Units>,

    /// Skip the forecast and trend chart
    #[arg(long, default_value_t = false)]
    no_forecast: bool,

    /// Skip the map pin
    #[arg(long, default_value_t = false)]
    no_map: bool,

    /// Print the report as JSON instead of text
    #[arg(long, default_value_t = false)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Weather at your IP-derived location
    Here,
    /// Weather for a city by name
    Search {
        #[arg(required = true, num_args = 1..)]
        city: Vec<String>,
    },
    /// Current conditions for a fixed list of world cities
    Quick,
    /// Interactive prompt
    Interactive,
}

struct Cli {
    services: AppServices,
    session: Session,
    render: RenderOptions,
    json: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    if let Err(e) = skycast_core::init("warn") {
        eprintln!("{:#}", e);
    }

    match run(args).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            if let Some(config_error) = e.downcast_ref::<ConfigError>() {
                eprintln!("{}", config_error.user_message());
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<bool> {
    let mut config = Config::load_at(args.config.as_deref())?;

    let api_key = args
        .api_key
        .as_deref()
        .and_then(ApiKey::new)
        .or_else(|| config.api_key());

    // Command-line values take the place of the file's for this run only
    if let Some(key) = &api_key {
        config.weather.api_key = Some(key.expose().to_string());
    }
    if let Some(units) = args.units {
        config.weather.units = units;
    }
    config.check()?;

    let services =
        AppServices::from_config(&config).context("Failed to set up weather services")?;

    let mut session = Session::new(&config.display).with_api_key(api_key);
    if args.no_forecast {
        session.show_forecast = false;
    }
    if args.no_map {
        session.show_map = false;
    }

    let mut cli = Cli {
        services,
        session,
        render: RenderOptions::from_config(&config),
        json: args.json,
    };

    tracing::info!("Running {:?}", args.command);

    let ok = match args.command {
        Command::Here => cli.here().await?,
        Command::Search { city } => cli.search(&city.join(" ")).await?,
        Command::Quick => cli.quick().await?,
        Command::Interactive => {
            cli.interactive().await?;
            true
        }
    };

    cli.session.clear();
    Ok(ok)
}

impl Cli {
    async fn here(&mut self) -> Result<bool> {
        let outcome = lookup_current_location(&self.services, &mut self.session).await;
        self.show(outcome)
    }

    async fn search(&mut self, query: &str) -> Result<bool> {
        let outcome = search_city(&self.services, &mut self.session, query).await;
        self.show(outcome)
    }

    /// Succeeds when at least one city could be shown.
    async fn quick(&mut self) -> Result<bool> {
        let check = match quick_check(&self.services, &self.session).await {
            Ok(check) => check,
            Err(e) => return Ok(report_error(&e)),
        };

        if self.json {
            let items: Vec<serde_json::Value> = check
                .results
                .iter()
                .map(|(city, outcome)| match outcome {
                    Ok(report) => serde_json::json!({ "city": city, "report": report }),
                    Err(e) => serde_json::json!({ "city": city, "error": e.user_message() }),
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&items)?);
            return Ok(check.any_succeeded());
        }

        println!("Quick Weather Check");
        println!("===================");
        for (city, outcome) in &check.results {
            match outcome {
                Ok(report) => println!(
                    "{:<12} {:>4}{}  {}",
                    city,
                    report.display_temperature(),
                    report.units.temperature_label(),
                    report.current.description
                ),
                Err(e) => println!("{:<12} {}", city, e.user_message()),
            }
        }

        if !check.any_succeeded() {
            eprintln!("Quick check failed for every city.");
        }
        Ok(check.any_succeeded())
    }

    fn show(&self, outcome: Result<WeatherReport, WeatherError>) -> Result<bool> {
        match outcome {
            Ok(report) => {
                self.print_report(&report)?;
                Ok(true)
            }
            Err(e) => Ok(report_error(&e)),
        }
    }

    fn print_report(&self, report: &WeatherReport) -> Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(report)?);
        } else {
            let options = RenderOptions {
                show_map: self.session.show_map,
                ..self.render.clone()
            };
            print!("{}", render_report(report, &options));
        }
        Ok(())
    }

    async fn interactive(&mut self) -> Result<()> {
        println!("Skycast interactive mode. Type 'help' for commands.");
        if !self.session.has_api_key() {
            let missing = WeatherError::MissingApiKey;
            println!("{}", missing.user_message());
            if let Some(help) = missing.help() {
                println!("{}", help);
            }
        }

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            print!("skycast> ");
            std::io::stdout().flush().context("Failed to flush stdout")?;

            let Some(line) = lines.next_line().await.context("Failed to read input")? else {
                break;
            };
            let line = line.trim();
            let (cmd, rest) = line.split_once(' ').unwrap_or((line, ""));
            let rest = rest.trim();

            match cmd {
                "" => {}
                "here" => {
                    self.here().await?;
                }
                "search" => {
                    self.search(rest).await?;
                }
                "quick" => {
                    self.quick().await?;
                }
                "key" => {
                    if self.session.set_api_key(rest) {
                        println!("API key set for this session.");
                    } else {
                        println!("Usage: key <your-api-key>");
                    }
                }
                "forecast" => match parse_toggle(rest) {
                    Some(on) => {
                        self.session.show_forecast = on;
                        println!("Forecast {}", if on { "on" } else { "off" });
                    }
                    None => println!("Usage: forecast on|off"),
                },
                "map" => match parse_toggle(rest) {
                    Some(on) => {
                        self.session.show_map = on;
                        println!("Map {}", if on { "on" } else { "off" });
                    }
                    None => println!("Usage: map on|off"),
                },
                "last" => match self.session.last_lookup() {
                    Some(report) => self.print_report(report)?,
                    None => println!("No lookup yet."),
                },
                "status" => println!("{}", self.session.summary()),
                "help" => print_help(),
                "quit" | "exit" => break,
                other => println!("Unknown command '{}'. Type 'help' for commands.", other),
            }
        }

        Ok(())
    }
}

fn parse_toggle(value: &str) -> Option<bool> {
    match value {
        "on" => Some(true),
        "off" => Some(false),
        _ => None,
    }
}

/// Print the user-facing message and report failure.
fn report_error(error: &WeatherError) -> bool {
    tracing::debug!("Action failed: {:?}", error);
    eprintln!("{}", error.user_message());
    if let Some(help) = error.help() {
        eprintln!("{}", help);
    }
    false
}

fn print_help() {
    println!("Commands:");
    println!("  here              weather at your current location");
    println!("  search <city>     weather for a city");
    println!("  quick             quick check of major world cities");
    println!("  key <api-key>     set the OpenWeatherMap API key");
    println!("  forecast on|off   toggle the 5-day forecast");
    println!("  map on|off        toggle the map pin");
    println!("  last              show the last lookup again");
    println!("  status            show mode, key and toggles");
    println!("  help              show this help");
    println!("  quit              exit");
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use skycast_core::{DisplayConfig, NetworkError};
    use skycast_ui::LookupSettings;
    use skycast_weather::{Geocoder, IpLocator, Location, WeatherSource};
    use std::sync::Arc;

    struct FixedPlace;

    fn place(name: &str) -> Location {
        Location {
            latitude: 51.5074,
            longitude: -0.1278,
            name: name.to_string(),
            country_code: Some("GB".to_string()),
            address: None,
        }
    }

    #[async_trait]
    impl Geocoder for FixedPlace {
        async fn locate_by_name(&self, query: &str) -> Result<Location, WeatherError> {
            Ok(place(query))
        }
    }

    #[async_trait]
    impl IpLocator for FixedPlace {
        async fn locate_current(&self) -> Location {
            place("London")
        }
    }

    /// Answers every current-conditions request the same way.
    struct StubWeather {
        reject_key: bool,
    }

    #[async_trait]
    impl WeatherSource for StubWeather {
        async fn fetch_current(
            &self,
            _api_key: &ApiKey,
            _latitude: f64,
            _longitude: f64,
            _units: Units,
        ) -> Result<Value, WeatherError> {
            if self.reject_key {
                return Err(NetworkError::ServerError {
                    status: 401,
                    message: "Invalid API key.".to_string(),
                }
                .into());
            }
            Ok(json!({
                "name": "London",
                "main": {"temp": 15.3, "feels_like": 14.1, "humidity": 72, "pressure": 1012},
                "visibility": 10000,
                "wind": {"speed": 4.6, "deg": 250},
                "weather": [{"description": "light rain", "icon": "10d"}],
                "sys": {"country": "GB", "sunrise": 1718682000, "sunset": 1718741400},
                "clouds": {"all": 75}
            }))
        }

        async fn fetch_forecast(
            &self,
            _api_key: &ApiKey,
            _latitude: f64,
            _longitude: f64,
            _units: Units,
            _days: u32,
        ) -> Result<Value, WeatherError> {
            Ok(json!({"list": []}))
        }
    }

    fn make_cli(reject_key: bool, json: bool) -> Cli {
        let display = DisplayConfig {
            show_forecast: false,
            ..DisplayConfig::default()
        };
        Cli {
            services: AppServices::new(
                Arc::new(FixedPlace),
                Arc::new(FixedPlace),
                Arc::new(StubWeather { reject_key }),
                LookupSettings::default(),
            ),
            session: Session::new(&display).with_api_key(ApiKey::new("test-key")),
            render: RenderOptions::default(),
            json,
        }
    }

    #[tokio::test]
    async fn test_quick_fails_when_every_city_is_rejected() {
        let mut cli = make_cli(true, false);
        assert!(!cli.quick().await.unwrap());
        assert!(!cli.search("London").await.unwrap());

        let mut json_cli = make_cli(true, true);
        assert!(!json_cli.quick().await.unwrap());
    }

    #[tokio::test]
    async fn test_quick_succeeds_with_reports() {
        let mut cli = make_cli(false, false);
        assert!(cli.quick().await.unwrap());

        let mut json_cli = make_cli(false, true);
        assert!(json_cli.quick().await.unwrap());
    }

    #[tokio::test]
    async fn test_quick_without_key_fails() {
        let mut cli = make_cli(false, false);
        cli.session.clear();
        assert!(!cli.quick().await.unwrap());
    }

    #[test]
    fn test_parse_toggle() {
        assert_eq!(parse_toggle("on"), Some(true));
        assert_eq!(parse_toggle("off"), Some(false));
        assert_eq!(parse_toggle("maybe"), None);
    }

    #[test]
    fn test_units_flag_parses() {
        let args = Args::try_parse_from(["skycast", "--units", "imperial", "quick"]).unwrap();
        assert_eq!(args.units, Some(Units::Imperial));
        assert!(Args::try_parse_from(["skycast", "--units", "furlongs", "quick"]).is_err());
    }
}
