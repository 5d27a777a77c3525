//! Command-line parsing for the `stepviz` binary.

use std::path::PathBuf;
use std::str::FromStr;

use stepviz_algos::{Objective, SortKind};

use crate::error::DemoError;

pub const USAGE: &str = "\
usage: stepviz <command> [options]

commands:
  astar [board.json]                      edit a grid and watch A* search it
  sort <bubble|selection|insertion|merge|quick>
  search <linear|binary>
  climb|anneal|genetic|swarm [config.json]
  kmeans [config.json]
  example <astar|climb|anneal|genetic|swarm|kmeans>
                                          print a default config as JSON

board files: fields left out take the 20x20 defaults, so a smaller
grid_size needs its own start and end.

options:
  --len N          array length (sort, search)
  --seed N         random seed
  --target N       value to look for (search)
  --objective F    quadratic, sine or rastrigin (climb, anneal, genetic, swarm)
  --delay MS       pause between steps

keys: space pause, r rerun, q quit";

/// One-dimensional optimizers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Climb,
    Anneal,
    Genetic,
    Swarm,
}

impl Method {
    pub fn name(self) -> &'static str {
        match self {
            Self::Climb => "hill climbing",
            Self::Anneal => "simulated annealing",
            Self::Genetic => "genetic algorithm",
            Self::Swarm => "particle swarm",
        }
    }

    /// Pause between steps when none is given.
    pub fn default_delay_ms(self) -> u64 {
        match self {
            Self::Climb => 100,
            Self::Anneal => 50,
            Self::Genetic | Self::Swarm => 150,
        }
    }
}

/// Options shared by the array commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrayOpts {
    pub len: usize,
    pub seed: Option<u64>,
    pub delay_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Astar {
        config: Option<PathBuf>,
    },
    Sort {
        kind: SortKind,
        opts: ArrayOpts,
    },
    Search {
        binary: bool,
        target: Option<i32>,
        opts: ArrayOpts,
    },
    Optimize {
        method: Method,
        config: Option<PathBuf>,
        objective: Option<Objective>,
        seed: Option<u64>,
        delay_ms: u64,
    },
    KMeans {
        config: Option<PathBuf>,
        seed: Option<u64>,
        delay_ms: u64,
    },
    Example {
        name: String,
    },
    Help,
}

#[derive(Debug, Default)]
struct Flags {
    positional: Vec<String>,
    len: Option<usize>,
    seed: Option<u64>,
    target: Option<i32>,
    objective: Option<Objective>,
    delay_ms: Option<u64>,
}

fn value<T: FromStr>(flag: &str, v: Option<&String>) -> Result<T, DemoError> {
    let v = v.ok_or_else(|| DemoError::usage(format!("{flag} needs a value")))?;
    v.parse()
        .map_err(|_| DemoError::usage(format!("{flag}: cannot parse `{v}`")))
}

impl Flags {
    fn parse(args: &[String]) -> Result<Self, DemoError> {
        let mut f = Flags::default();
        let mut it = args.iter();
        while let Some(a) = it.next() {
            match a.as_str() {
                "--len" => f.len = Some(value(a, it.next())?),
                "--seed" => f.seed = Some(value(a, it.next())?),
                "--target" => f.target = Some(value(a, it.next())?),
                "--delay" => f.delay_ms = Some(value(a, it.next())?),
                "--objective" => {
                    let name: String = value(a, it.next())?;
                    let o = Objective::from_name(&name)
                        .ok_or_else(|| DemoError::usage(format!("unknown objective `{name}`")))?;
                    f.objective = Some(o);
                }
                flag if flag.starts_with("--") => {
                    return Err(DemoError::usage(format!("unknown option `{flag}`")));
                }
                _ => f.positional.push(a.clone()),
            }
        }
        Ok(f)
    }

    fn config(&self) -> Result<Option<PathBuf>, DemoError> {
        match self.positional.as_slice() {
            [] => Ok(None),
            [p] => Ok(Some(PathBuf::from(p))),
            [_, extra, ..] => Err(DemoError::usage(format!("unexpected argument `{extra}`"))),
        }
    }

    fn array_opts(&self, delay_ms: u64) -> ArrayOpts {
        ArrayOpts {
            len: self.len.unwrap_or(30),
            seed: self.seed,
            delay_ms: self.delay_ms.unwrap_or(delay_ms),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Args {
    pub command: Command,
}

impl Args {
    /// Parse `args`, the program name first.
    pub fn parse_from<I, S>(args: I) -> Result<Self, DemoError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let args: Vec<String> = args.into_iter().map(|s| s.as_ref().to_string()).collect();
        let Some(cmd) = args.get(1) else {
            return Ok(Self {
                command: Command::Help,
            });
        };
        let flags = Flags::parse(&args[2..])?;

        let command = match cmd.as_str() {
            "astar" => Command::Astar {
                config: flags.config()?,
            },
            "sort" => {
                let name = flags.positional.first().map(String::as_str).unwrap_or("quick");
                let kind = SortKind::from_name(name)
                    .ok_or_else(|| DemoError::usage(format!("unknown sort `{name}`")))?;
                Command::Sort {
                    kind,
                    opts: flags.array_opts(40),
                }
            }
            "search" => {
                let binary = match flags.positional.first().map(String::as_str) {
                    None | Some("binary") => true,
                    Some("linear") => false,
                    Some(other) => {
                        return Err(DemoError::usage(format!("unknown search `{other}`")));
                    }
                };
                Command::Search {
                    binary,
                    target: flags.target,
                    opts: flags.array_opts(300),
                }
            }
            name @ ("climb" | "anneal" | "genetic" | "swarm") => {
                let method = match name {
                    "climb" => Method::Climb,
                    "anneal" => Method::Anneal,
                    "genetic" => Method::Genetic,
                    _ => Method::Swarm,
                };
                Command::Optimize {
                    method,
                    config: flags.config()?,
                    objective: flags.objective,
                    seed: flags.seed,
                    delay_ms: flags.delay_ms.unwrap_or(method.default_delay_ms()),
                }
            }
            "kmeans" => Command::KMeans {
                config: flags.config()?,
                seed: flags.seed,
                delay_ms: flags.delay_ms.unwrap_or(400),
            },
            "example" => {
                let name = flags
                    .positional
                    .first()
                    .cloned()
                    .ok_or_else(|| DemoError::usage("example needs a name"))?;
                Command::Example { name }
            }
            "-h" | "--help" | "help" => Command::Help,
            unknown => return Err(DemoError::usage(format!("unknown command `{unknown}`"))),
        };
        Ok(Self { command })
    }

    pub fn parse() -> Result<Self, DemoError> {
        Self::parse_from(std::env::args())
    }
}
