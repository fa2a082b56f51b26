//! The fixed command-line option grammar and its application to
//! [`Settings`].

use clap::Parser;

use crate::{Settings, Verbosity};

/// Command-line options accepted by the daemon.
///
/// The grammar is fixed at build time. Scalar options follow
/// last-occurrence-wins; `--chroot-directory` may repeat and accumulates
/// into a set.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "kilnd",
    version,
    about = "Perform builds and store accesses on behalf of clients",
    long_about = "This program is a daemon meant to run in the background. It serves \
                  requests sent over a local socket, accesses the store, and builds \
                  derivations on behalf of its clients."
)]
pub struct Options {
    /// Assume SYSTEM as the current system type.
    #[arg(long, value_name = "SYSTEM")]
    pub system: Option<String>,

    /// Use N CPU cores to build each derivation; 0 means as many as available.
    #[arg(short = 'C', long = "build-cores", value_name = "N", value_parser = lenient_count)]
    pub build_cores: Option<u32>,

    /// Allow at most N build jobs.
    #[arg(short = 'M', long = "max-jobs", value_name = "N", value_parser = lenient_count)]
    pub max_jobs: Option<u32>,

    /// Disable chroot builds.
    #[arg(long)]
    pub disable_chroot: bool,

    /// Add DIR to the build chroot.
    #[arg(long = "chroot-directory", value_name = "DIR")]
    pub chroot_directories: Vec<String>,

    /// Perform builds as a user of GROUP.
    #[arg(long = "build-users-group", value_name = "GROUP")]
    pub build_users_group: Option<String>,

    /// Cache build failures.
    #[arg(long)]
    pub cache_failures: bool,

    /// Do not keep build logs.
    #[arg(long)]
    pub lose_logs: bool,

    /// Disable compression of the build logs.
    #[arg(long)]
    pub disable_log_compression: bool,

    /// Disable automatic file deduplication in the store.
    #[arg(long)]
    pub disable_store_optimization: bool,

    /// Impersonate Linux 2.6.
    #[arg(long = "impersonate-linux-2.6")]
    pub impersonate_linux_26: bool,

    /// Produce debugging output.
    #[arg(long)]
    pub debug: bool,
}

impl Options {
    /// Applies the parsed options to `settings`, field by field. Absent
    /// options leave their fields untouched.
    pub fn apply_to(&self, settings: &mut Settings) {
        if let Some(system) = &self.system {
            settings.this_system = system.clone();
        }
        if let Some(cores) = self.build_cores {
            settings.build_cores = cores;
        }
        if let Some(jobs) = self.max_jobs {
            settings.max_build_jobs = Some(jobs);
        }
        if self.disable_chroot {
            settings.use_chroot = false;
        }
        for dir in &self.chroot_directories {
            settings.chroot_dirs.insert(dir.clone());
        }
        if let Some(group) = &self.build_users_group {
            settings.build_users_group = group.clone();
        }
        if self.cache_failures {
            settings.cache_failures = true;
        }
        if self.lose_logs {
            settings.keep_log = false;
        }
        if self.disable_log_compression {
            settings.compress_log = false;
        }
        if self.disable_store_optimization {
            settings.auto_optimise_store = false;
        }
        if self.impersonate_linux_26 {
            settings.impersonate_linux_26 = true;
        }
        if self.debug {
            settings.verbosity = Verbosity::Debug;
        }
    }
}

/// Count parser with the historical lenient behaviour: an optional `+` sign
/// and leading digits are honoured, anything else degrades to zero rather
/// than failing the parse. Negative values also degrade to zero; the fields
/// fed by this parser are unsigned.
fn lenient_count(raw: &str) -> Result<u32, std::convert::Infallible> {
    let trimmed = raw.trim_start();
    let unsigned = trimmed.strip_prefix('+').unwrap_or(trimmed);
    let digits: String = unsigned
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    Ok(digits.parse().unwrap_or(0))
}
