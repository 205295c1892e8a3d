//! Where temperatures come from: an external program that prints one.

use std::ffi::OsString;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;
use std::process::{Command, ExitStatus, Stdio};

use tm1637::Reading;

/// Anything that can be asked for the current temperature.
///
/// A failed reading is [`Reading::Unavailable`], not an error: the display shows `Err` and the
/// next cycle tries again.
pub trait TemperatureSource {
    fn read(&mut self) -> Reading;
}

#[derive(Debug, thiserror::Error)]
pub enum SensorError {
    #[error("{0} not found or not executable")]
    NotExecutable(PathBuf),

    #[error("failed to run {path}: {source}")]
    Spawn {
        path: PathBuf,
        source: io::Error,
    },

    #[error("no data received from {0}")]
    NoOutput(PathBuf),

    #[error("no temperature in sensor output {0:?}")]
    Malformed(String),

    #[error("{path} failed ({status})")]
    Failed { path: PathBuf, status: ExitStatus },
}

/// Runs a program and takes the number at the start of the first line it prints as the
/// temperature in degrees Celsius.
///
/// The program must exit successfully for the reading to count.
pub struct CommandSource {
    program: PathBuf,
    args: Vec<OsString>,
}

impl CommandSource {
    pub fn new(
        program: impl Into<PathBuf>,
        args: impl IntoIterator<Item = impl Into<OsString>>,
    ) -> Self {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Run the program once and parse its output
    pub fn measure(&self) -> Result<i16, SensorError> {
        // The kernel does the permission check for the user we run as, and reports a program
        // we may not execute the same way as a missing one
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .spawn()
            .map_err(|source| match source.kind() {
                io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied => {
                    SensorError::NotExecutable(self.program.clone())
                }
                _ => SensorError::Spawn {
                    path: self.program.clone(),
                    source,
                },
            })?;

        let mut line = String::new();
        let read = match child.stdout.take() {
            Some(stdout) => {
                let mut reader = BufReader::new(stdout);

                // Drain whatever follows the first line, or the program dies of SIGPIPE writing it
                reader
                    .read_line(&mut line)
                    .and_then(|len| io::copy(&mut reader, &mut io::sink()).map(|_| len))
            }
            None => Ok(0),
        };

        // Always reap the child, whatever happened to its output
        let status = child.wait().map_err(|source| SensorError::Spawn {
            path: self.program.clone(),
            source,
        })?;

        match read {
            Ok(0) | Err(_) => return Err(SensorError::NoOutput(self.program.clone())),
            Ok(_) => {}
        }

        log::info!("{}", line.trim_end());

        let tenths = parse_tenths(&line)
            .ok_or_else(|| SensorError::Malformed(line.trim_end().to_string()))?;

        if !status.success() {
            return Err(SensorError::Failed {
                path: self.program.clone(),
                status,
            });
        }

        Ok(tenths)
    }
}

impl TemperatureSource for CommandSource {
    fn read(&mut self) -> Reading {
        match self.measure() {
            Ok(tenths) => Reading::Tenths(tenths),
            Err(e) => {
                log::error!("{}", e);
                Reading::Unavailable
            }
        }
    }
}

/// Parse the number at the start of `line` (leading whitespace is fine, trailing text is ignored)
/// as degrees Celsius, and convert it to tenths of a degree, truncating toward zero.
///
/// The number may have a sign, a fraction and an exponent, as in `-2.35e1`.  Values too large for
/// an `i16` saturate; they show as overflow on the display either way.
pub fn parse_tenths(line: &str) -> Option<i16> {
    let line = line.trim_start();
    let bytes = line.as_bytes();

    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }

    let integer = digits(&bytes[end..]);
    end += integer;

    let mut fraction = 0;
    if bytes.get(end) == Some(&b'.') {
        fraction = digits(&bytes[end + 1..]);
        end += 1 + fraction;
    }

    if integer + fraction == 0 {
        return None;
    }

    // An exponent only counts if it has digits; "5e" is just 5
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exponent = end + 1;
        if matches!(bytes.get(exponent), Some(b'+' | b'-')) {
            exponent += 1;
        }

        let len = digits(&bytes[exponent..]);
        if len > 0 {
            end = exponent + len;
        }
    }

    let celsius: f32 = line[..end].parse().ok()?;

    // `as` saturates at the i16 limits and truncates toward zero
    Some((celsius * 10.0) as i16)
}

fn digits(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|b| b.is_ascii_digit()).count()
}
