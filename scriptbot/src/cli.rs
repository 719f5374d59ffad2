//! Command-line argument parsing.
//!
//! Usage:
//!   scriptbot [-f[<rcfile>]] [-p<prefix>] [-c<source>] [-nd] [<script>…]
//!
//! Positional arguments are script files (or directories of script files)
//! registered in addition to those named by the rc file.

use std::path::PathBuf;

// ── Public types ──────────────────────────────────────────────────────────────

/// Parsed command-line arguments.
#[derive(Debug, Default, PartialEq)]
pub struct CliArgs {
    /// Rc-file specification.
    pub rc_file: RcFile,
    /// Trigger prefix override (`-p<prefix>`).
    pub prefix: Option<String>,
    /// Inline script source to register (`-c<source>`).
    pub inline_script: Option<String>,
    /// Batch mode: run startup scripts, then exit without reading stdin
    /// (`-n`).
    pub batch: bool,
    /// Debug logging (`-d`).
    pub debug: bool,
    /// Positional script files or directories.
    pub scripts: Vec<PathBuf>,
}

/// How to choose the rc file.
#[derive(Debug, Default, PartialEq)]
pub enum RcFile {
    /// Search the usual locations (default).
    #[default]
    Search,
    /// `-f` with no file argument: skip the rc file.
    Skip,
    /// `-f<file>`: load this specific file.
    Explicit(PathBuf),
}

// ── Parsing ───────────────────────────────────────────────────────────────────

/// Parse `std::env::args()` into [`CliArgs`] or an error message.
pub fn parse_args() -> Result<CliArgs, String> {
    parse_from(std::env::args().skip(1))
}

/// Option values may be attached (`-p!`) or separated (`-p !`).
pub fn parse_from(args: impl IntoIterator<Item = String>) -> Result<CliArgs, String> {
    let mut out = CliArgs::default();
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        let Some(opts) = arg.strip_prefix('-') else {
            out.scripts.push(PathBuf::from(arg));
            continue;
        };
        if opts.is_empty() {
            return Err("unexpected bare '-'".into());
        }

        let mut chars = opts.chars();
        while let Some(flag) = chars.next() {
            match flag {
                'n' => out.batch = true,
                'd' => out.debug = true,
                'f' => {
                    // `-f` alone skips the rc file; `-f<file>` names one.
                    let rest: String = chars.collect();
                    out.rc_file = if rest.is_empty() {
                        RcFile::Skip
                    } else {
                        RcFile::Explicit(PathBuf::from(rest))
                    };
                    break;
                }
                'p' => {
                    let value = value_for('p', &mut chars, &mut args)?;
                    out.prefix = Some(value);
                    break;
                }
                'c' => {
                    let value = value_for('c', &mut chars, &mut args)?;
                    out.inline_script = Some(value);
                    break;
                }
                other => return Err(format!("unknown option -{other}")),
            }
        }
    }

    Ok(out)
}

/// The rest of the current token, or the next argument.
fn value_for(
    flag: char,
    chars: &mut std::str::Chars<'_>,
    args: &mut impl Iterator<Item = String>,
) -> Result<String, String> {
    let attached: String = chars.collect();
    if !attached.is_empty() {
        return Ok(attached);
    }
    args.next().ok_or_else(|| format!("-{flag} requires a value"))
}

/// One-line usage string for error output.
pub fn usage() -> &'static str {
    "Usage: scriptbot [-f[<rcfile>]] [-p<prefix>] [-c<source>] [-nd] [<script>...]"
}

// ── Tests ─────────────────────────────────────────────────────────────────────
