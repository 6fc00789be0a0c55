use crate::state::recorder::ScoreSink;
use log::LevelFilter;
use scoreboard_engine::{MAX_ENDS, MatchConfig, Sport};
use std::path::PathBuf;

const APP_DIR: &str = "obie-scoreboard";

#[derive(Debug, Clone, PartialEq)]
pub struct AppSettings {
    pub sport: Sport,
    pub resume: bool,
    pub full_screen: bool,
    pub log_level: Option<LevelFilter>,
    pub match_config: MatchConfig,
    pub sink: ScoreSink,
    pub config_dir: PathBuf,
}

impl AppSettings {
    /// Command line first, then `OBIE_*` environment variables, then defaults.
    pub fn load() -> Result<Self, String> {
        let args: Vec<String> = std::env::args().skip(1).collect();
        Self::from_sources(&args, |key| std::env::var(key).ok())
    }

    pub fn from_sources(
        args: &[String],
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, String> {
        let env = |key: &str| env(key).filter(|v| !v.trim().is_empty());

        let mut game = env("OBIE_GAME");
        let mut resume = env("OBIE_RESUME").is_some_and(|v| is_truthy(&v));
        let mut args = args.iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "-g" | "--game" => {
                    let value = args.next().ok_or("--game needs a value (bocce or curling)")?;
                    game = Some(value.clone());
                }
                "-r" | "--resume" => resume = true,
                other => {
                    if let Some(value) = other.strip_prefix("--game=") {
                        game = Some(value.to_string());
                    } else {
                        return Err(format!("Unknown argument: {other}"));
                    }
                }
            }
        }

        let sport = match game {
            Some(name) => name.parse::<Sport>()?,
            None => Sport::Bocce,
        };

        let mut match_config = MatchConfig::default();
        if let Some(minutes) = env("OBIE_GAME_MINUTES") {
            match_config.game_minutes = parse_in_range("OBIE_GAME_MINUTES", &minutes, 1, 99)?;
        }
        if let Some(ends) = env("OBIE_DEFAULT_ENDS") {
            match_config.default_ends = parse_in_range("OBIE_DEFAULT_ENDS", &ends, 1, MAX_ENDS)?;
        }

        let log_level = match env("OBIE_LOG") {
            Some(level) => Some(
                level
                    .trim()
                    .parse::<LevelFilter>()
                    .map_err(|_| format!("OBIE_LOG: unknown log level {level}"))?,
            ),
            None => None,
        };

        let config_dir = config_dir(&env);
        let sink = match (env("OBIE_RECORD_URL"), env("OBIE_RECORD_FILE")) {
            (Some(url), _) => ScoreSink::Webhook(url.trim().to_string()),
            (None, Some(path)) => ScoreSink::JsonLines(PathBuf::from(path)),
            (None, None) => ScoreSink::JsonLines(config_dir.join("scores.jsonl")),
        };

        Ok(Self {
            sport,
            resume,
            full_screen: false,
            log_level,
            match_config,
            sink,
            config_dir,
        })
    }

    /// Where the running session of `sport` is snapshotted for `--resume`.
    pub fn snapshot_path(&self, sport: Sport) -> PathBuf {
        self.config_dir.join(format!("session_{sport}.json"))
    }
}

fn config_dir(env: &impl Fn(&str) -> Option<String>) -> PathBuf {
    if let Some(config_dir) = env("XDG_CONFIG_HOME") {
        return PathBuf::from(config_dir).join(APP_DIR);
    }
    if let Some(home) = env("HOME") {
        return PathBuf::from(home).join(".config").join(APP_DIR);
    }
    PathBuf::from(APP_DIR)
}

fn parse_in_range(key: &str, value: &str, min: u8, max: u8) -> Result<u8, String> {
    value
        .trim()
        .parse::<u8>()
        .ok()
        .filter(|n| (min..=max).contains(n))
        .ok_or_else(|| format!("{key}: expected a number between {min} and {max}, got {value}"))
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
