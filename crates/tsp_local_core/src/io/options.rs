use std::{env, path::Path, time::Duration};

use log::LevelFilter;
use tsp_local_derive::{CliOptions, CliValue, KvDisplay};

use crate::{
    Error, Result,
    isolation::DEFAULT_ISOLATION_MULTIPLIER,
    local_search::{DEFAULT_IMPROVEMENT_EPSILON, Refinement, SearchLimits},
};

/// Runtime options for a solve.
#[derive(Clone, Debug, CliOptions, KvDisplay)]
pub struct SolverOptions {
    /// Input CSV path; `-` reads stdin. Set from the single positional argument.
    pub input: String,
    /// Output path. Empty derives it from the input name, `-` means stdout.
    #[cli(long = "output")]
    #[kv(or_none)]
    pub output: String,
    /// Local search run after construction.
    #[cli(long = "refinement", parse_with = "Refinement::parse")]
    pub refinement: Refinement,
    /// A point is isolated when its nearest-neighbour distance exceeds this
    /// multiple of the mean nearest-neighbour distance.
    #[cli(long = "isolation-multiplier")]
    pub isolation_multiplier: f64,
    /// Cap on 2-opt sweeps / 3-opt moves. 0 means unlimited.
    #[cli(long = "max-iterations")]
    pub max_iterations: usize,
    /// Wall-clock budget for the local search in seconds. 0 means unlimited.
    #[cli(long = "time-limit")]
    pub time_limit: f64,
    /// Minimum length reduction for a move to count as improving.
    #[cli(long = "improvement-epsilon")]
    pub improvement_epsilon: f64,
    /// Edges longer than this multiple of the average edge are reported as outliers.
    #[cli(long = "outlier-factor")]
    pub outlier_factor: f64,
    /// Structured logging level.
    #[cli(long = "log-level", parse_with = "LogLevel::parse")]
    pub log_level: LogLevel,
    /// Logging output format.
    #[cli(long = "log-format", parse_with = "LogFormat::parse")]
    pub log_format: LogFormat,
    /// Include timestamps in log lines.
    #[cli(long = "log-timestamp", flag)]
    pub log_timestamp: bool,
    /// Optional output file path for logs and metrics. Empty means stderr.
    #[cli(long = "log-output")]
    #[kv(or_none)]
    pub log_output: String,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, CliValue)]
#[cli_value(option = "log-level")]
pub enum LogLevel {
    Error,
    #[cli(alias = "warning")]
    Warn,
    Info,
    Debug,
    Trace,
    Off,
}

impl LogLevel {
    pub fn to_filter(self) -> LevelFilter {
        match self {
            Self::Error => LevelFilter::Error,
            Self::Warn => LevelFilter::Warn,
            Self::Info => LevelFilter::Info,
            Self::Debug => LevelFilter::Debug,
            Self::Trace => LevelFilter::Trace,
            Self::Off => LevelFilter::Off,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, CliValue)]
#[cli_value(option = "log-format")]
pub enum LogFormat {
    Compact,
    Pretty,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            input: String::new(),
            output: String::new(),
            refinement: Refinement::TwoOpt,
            isolation_multiplier: DEFAULT_ISOLATION_MULTIPLIER,
            max_iterations: 0,
            time_limit: 0.0,
            improvement_epsilon: DEFAULT_IMPROVEMENT_EPSILON,
            outlier_factor: 3.0,
            log_level: LogLevel::Warn,
            log_format: LogFormat::Compact,
            log_timestamp: true,
            log_output: String::new(),
        }
    }
}

impl SolverOptions {
    pub fn from_args() -> Result<Self> {
        Self::parse_from_iter(env::args().skip(1))
    }

    pub fn parse_from_iter<I, S>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut options = Self::default();
        let mut positional: Vec<String> = Vec::new();
        let mut args = args
            .into_iter()
            .map(|arg| arg.as_ref().to_owned())
            .peekable();

        while let Some(arg) = args.next() {
            if arg == "--help" || arg == "-h" {
                return Err(Error::Help(Self::usage()));
            }

            let Some(raw_name) = arg.strip_prefix("--") else {
                positional.push(arg);
                continue;
            };

            if raw_name.is_empty() {
                // `--` ends option parsing.
                positional.extend(args.by_ref());
                break;
            }

            let (name, value) = Self::split_arg(raw_name, &mut args);
            if !options.apply_cli_option(&name, value)? {
                return Err(Error::usage(format!(
                    "Unknown option: --{name}\n\n{}",
                    Self::usage()
                )));
            }
        }

        options.input = match positional.len() {
            1 => positional.remove(0),
            0 => {
                return Err(Error::usage(format!(
                    "Missing input file argument\n\n{}",
                    Self::usage()
                )));
            }
            _ => {
                return Err(Error::usage(format!(
                    "Expected exactly one input file, got {}: {}\n\n{}",
                    positional.len(),
                    positional.join(" "),
                    Self::usage()
                )));
            }
        };

        options.validate()?;
        Ok(options)
    }

    fn validate(&self) -> Result<()> {
        let non_negative = [
            ("isolation-multiplier", self.isolation_multiplier),
            ("time-limit", self.time_limit),
            ("improvement-epsilon", self.improvement_epsilon),
            ("outlier-factor", self.outlier_factor),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::invalid_input(format!(
                    "Invalid value for --{name}: {value} (expected a finite number >= 0)"
                )));
            }
        }
        Ok(())
    }

    pub fn usage() -> String {
        format!(
            concat!(
                "Usage:\n",
                "  tsp-local [options] <input.csv>\n",
                "  tsp-local [options] - < points.csv\n\n",
                "Reads `x,y` rows (an optional header row is skipped) and writes the\n",
                "visiting order as an `index` column. Without --output the result goes\n",
                "to the input path with `input_` replaced by `output_`.\n\n",
                "Options:\n",
                "  --output <path|->\n",
                "  --refinement <{refinement}>\n",
                "  --isolation-multiplier <f64>\n",
                "  --max-iterations <usize>\n",
                "  --time-limit <seconds>\n",
                "  --improvement-epsilon <f64>\n",
                "  --outlier-factor <f64>\n",
                "  --log-level <{log_level}>\n",
                "  --log-format <{log_format}>\n",
                "  --log-timestamp[=<bool>]\n",
                "  --no-log-timestamp\n",
                "  --log-output <path>\n",
                "  --help\n",
                "\n",
                "Examples:\n",
                "  tsp-local data/input_6.csv\n",
                "  tsp-local --refinement three-opt --time-limit 30 data/input_5.csv\n",
                "  tsp-local --output - --log-level=info points.csv\n",
            ),
            refinement = Refinement::VALUES,
            log_level = LogLevel::VALUES,
            log_format = LogFormat::VALUES,
        )
    }

    pub fn search_limits(&self) -> SearchLimits {
        SearchLimits {
            max_iterations: (self.max_iterations > 0).then_some(self.max_iterations),
            time_limit: (self.time_limit > 0.0).then(|| Duration::from_secs_f64(self.time_limit)),
            epsilon: self.improvement_epsilon,
        }
    }

    pub fn input_path(&self) -> Option<&Path> {
        let input = self.input.trim();
        if input.is_empty() || input == "-" {
            None
        } else {
            Some(Path::new(input))
        }
    }

    /// `None` when no explicit output was given.
    pub fn output_arg(&self) -> Option<&str> {
        let output = self.output.trim();
        (!output.is_empty()).then_some(output)
    }

    pub fn log_output_path(&self) -> Option<&Path> {
        let log_output = self.log_output.trim();
        if log_output.is_empty() || log_output == "-" {
            None
        } else {
            Some(Path::new(log_output))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use log::LevelFilter;

    use super::{LogFormat, LogLevel, SolverOptions};
    use crate::{Error, local_search::Refinement};

    #[test]
    fn log_level_maps_to_expected_filter() {
        assert_eq!(LogLevel::Error.to_filter(), LevelFilter::Error);
        assert_eq!(LogLevel::Warn.to_filter(), LevelFilter::Warn);
        assert_eq!(LogLevel::Info.to_filter(), LevelFilter::Info);
        assert_eq!(LogLevel::Debug.to_filter(), LevelFilter::Debug);
        assert_eq!(LogLevel::Trace.to_filter(), LevelFilter::Trace);
        assert_eq!(LogLevel::Off.to_filter(), LevelFilter::Off);
    }

    #[test]
    fn parse_from_iter_applies_known_cli_options() {
        let options = SolverOptions::parse_from_iter([
            "--output=out.csv",
            "--refinement=three-opt",
            "--isolation-multiplier=2.5",
            "--max-iterations=40",
            "--time-limit=1.5",
            "--improvement-epsilon=0.001",
            "--outlier-factor=4",
            "--log-level=debug",
            "--log-format=pretty",
            "--log-timestamp=false",
            "--log-output=run.log",
            "input_7.csv",
        ])
        .expect("parse options");

        assert_eq!(options.input, "input_7.csv");
        assert_eq!(options.output, "out.csv");
        assert_eq!(options.refinement, Refinement::ThreeOpt);
        assert_eq!(options.isolation_multiplier, 2.5);
        assert_eq!(options.max_iterations, 40);
        assert_eq!(options.time_limit, 1.5);
        assert_eq!(options.improvement_epsilon, 0.001);
        assert_eq!(options.outlier_factor, 4.0);
        assert_eq!(options.log_level, LogLevel::Debug);
        assert_eq!(options.log_format, LogFormat::Pretty);
        assert!(!options.log_timestamp);
        assert_eq!(options.log_output, "run.log");
    }

    #[test]
    fn space_separated_values_are_accepted() {
        let options =
            SolverOptions::parse_from_iter(["--refinement", "3-opt", "input_1.csv"])
                .expect("parse options");
        assert_eq!(options.refinement, Refinement::ThreeOpt);
        assert_eq!(options.input, "input_1.csv");
    }

    #[test]
    fn flags_do_not_swallow_the_positional_input() {
        let options = SolverOptions::parse_from_iter(["--log-timestamp", "input_2.csv"])
            .expect("parse options");
        assert!(options.log_timestamp);
        assert_eq!(options.input, "input_2.csv");

        let options = SolverOptions::parse_from_iter(["--no-log-timestamp", "input_2.csv"])
            .expect("parse options");
        assert!(!options.log_timestamp);
    }

    #[test]
    fn negated_flag_rejects_a_value() {
        let err = SolverOptions::parse_from_iter(["--no-log-timestamp=true", "input_2.csv"])
            .expect_err("expected flag value rejection");
        assert!(err.to_string().contains("does not take a value"));
    }

    #[test]
    fn invalid_boolean_is_rejected() {
        let err = SolverOptions::parse_from_iter(["--log-timestamp=maybe", "input_2.csv"])
            .expect_err("invalid bool should fail");
        assert!(
            err.to_string()
                .contains("Invalid boolean for --log-timestamp: maybe")
        );
    }

    #[test]
    fn missing_input_is_a_usage_error() {
        let err = SolverOptions::parse_from_iter(Vec::<String>::new())
            .expect_err("missing input should fail");
        assert!(matches!(err, Error::Usage(_)));
        assert!(err.to_string().contains("Missing input file argument"));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn extra_positional_arguments_are_rejected() {
        let err = SolverOptions::parse_from_iter(["input_1.csv", "input_2.csv"])
            .expect_err("two inputs should fail");
        assert!(err.to_string().contains("Expected exactly one input file, got 2"));
    }

    #[test]
    fn double_dash_ends_option_parsing() {
        let options =
            SolverOptions::parse_from_iter(["--", "--odd-name.csv"]).expect("parse options");
        assert_eq!(options.input, "--odd-name.csv");
    }

    #[test]
    fn unknown_option_is_rejected() {
        let err = SolverOptions::parse_from_iter(["--or-opt", "input_1.csv"])
            .expect_err("expected unknown option error");
        assert!(err.to_string().contains("Unknown option: --or-opt"));
    }

    #[test]
    fn missing_value_is_rejected() {
        let err = SolverOptions::parse_from_iter(["input_1.csv", "--max-iterations"])
            .expect_err("missing value should fail");
        assert!(err.to_string().contains("Missing value for --max-iterations"));
    }

    #[test]
    fn malformed_number_is_rejected() {
        let err = SolverOptions::parse_from_iter(["--time-limit=soon", "input_1.csv"])
            .expect_err("bad number should fail");
        assert!(err.to_string().contains("Invalid value for --time-limit: soon"));
    }

    #[test]
    fn negative_multiplier_is_rejected() {
        let err = SolverOptions::parse_from_iter(["--isolation-multiplier=-1", "input_1.csv"])
            .expect_err("negative multiplier should fail");
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn help_short_circuits_with_usage_text() {
        for flag in ["--help", "-h"] {
            let err = SolverOptions::parse_from_iter([flag, "input_1.csv"])
                .expect_err("help should short-circuit");
            assert!(matches!(err, Error::Help(_)));
            assert_eq!(err.exit_code(), 0);
            assert!(err.to_string().contains("Usage:"));
            assert!(err.to_string().contains("two-opt|three-opt|none"));
        }
    }

    #[test]
    fn defaults_match_reference_heuristic() {
        let options = SolverOptions::default();
        assert_eq!(options.refinement, Refinement::TwoOpt);
        assert_eq!(options.isolation_multiplier, 1.5);
        assert_eq!(options.search_limits().max_iterations, None);
        assert_eq!(options.search_limits().time_limit, None);
    }

    #[test]
    fn display_lists_every_option() {
        let rendered = SolverOptions::default().to_string();
        let line = |key: &str| {
            rendered
                .lines()
                .find(|line| line.trim_start().starts_with(&format!("{key} ")))
                .map(|line| line.trim().to_string())
                .expect("key should be rendered")
        };

        assert!(line("refinement").ends_with("= two-opt"));
        assert!(line("isolation_multiplier").ends_with("= 1.5"));
        assert!(line("output").ends_with("= none"));
        assert!(line("log_level").ends_with("= warn"));
    }

    #[test]
    fn search_limits_treat_zero_as_unlimited() {
        let options = SolverOptions {
            max_iterations: 12,
            time_limit: 0.25,
            ..SolverOptions::default()
        };
        let limits = options.search_limits();
        assert_eq!(limits.max_iterations, Some(12));
        assert_eq!(limits.time_limit, Some(Duration::from_millis(250)));
    }

    #[test]
    fn input_path_treats_dash_as_stdin() {
        let options = SolverOptions {
            input: "-".to_string(),
            ..SolverOptions::default()
        };
        assert!(options.input_path().is_none());

        let options = SolverOptions {
            input: "data/input_3.csv".to_string(),
            ..SolverOptions::default()
        };
        assert_eq!(
            options.input_path().expect("path should exist"),
            std::path::Path::new("data/input_3.csv")
        );
    }

    #[test]
    fn log_output_path_treats_empty_and_dash_as_stderr() {
        let options = SolverOptions::default();
        assert!(options.log_output_path().is_none());

        let options = SolverOptions {
            log_output: "-".to_string(),
            ..SolverOptions::default()
        };
        assert!(options.log_output_path().is_none());
    }
}
