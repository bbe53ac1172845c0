// SPDX-License-Identifier: PMPL-1.0-or-later

//! dkms-apport: file a problem report when a DKMS module fails to build

use clap::Parser;
use dkms_apport::hook::{self, HookError};
use dkms_apport::packaging::DpkgIndex;
use dkms_apport::report::{ReportFormatter, ReportOutputFormat};
use dkms_apport::telemetry;
use dkms_apport::types::{
    HookConfig, SignaturePolicy, DEFAULT_DKMS_TREE, DEFAULT_REPORT_DIR, DEFAULT_SOURCE_TREE,
};
use std::path::PathBuf;
use std::process;

#[derive(Parser)]
#[command(name = "dkms-apport")]
#[command(version)]
#[command(about = "Report a DKMS kernel module build failure to apport")]
#[command(long_about = None)]
struct Cli {
    /// DKMS module to find the package for
    #[arg(short = 'm', value_name = "MODULE")]
    module: Option<String>,

    /// DKMS module version to find the package for
    #[arg(short = 'v', id = "module_version", value_name = "VERSION")]
    version: Option<String>,

    /// Kernel version the module was built against
    #[arg(short = 'k', value_name = "KERNEL")]
    kernel: Option<String>,

    /// DKMS tree holding module build directories
    #[arg(long, env = "DKMS_TREE", default_value = DEFAULT_DKMS_TREE)]
    dkms_tree: PathBuf,

    /// Directory DKMS module sources are installed under
    #[arg(long, env = "DKMS_SOURCE_TREE", default_value = DEFAULT_SOURCE_TREE)]
    source_tree: PathBuf,

    /// Directory reports are written to
    #[arg(long, env = "APPORT_REPORT_DIR", default_value = DEFAULT_REPORT_DIR)]
    report_dir: PathBuf,

    /// How the duplicate signature is derived from the build log
    #[arg(long = "signature", value_enum, default_value = "first-error")]
    signature_policy: SignaturePolicy,

    /// Report encoding
    #[arg(long, value_enum, default_value = "apport")]
    format: ReportOutputFormat,

    /// Print the report instead of writing it
    #[arg(long)]
    stdout: bool,

    /// Verbose diagnostics on stderr
    #[arg(long)]
    verbose: bool,
}

impl From<Cli> for HookConfig {
    fn from(cli: Cli) -> Self {
        HookConfig {
            module: cli.module,
            version: cli.version,
            kernel: cli.kernel,
            dkms_tree: cli.dkms_tree,
            source_tree: cli.source_tree,
            report_dir: cli.report_dir,
            signature_policy: cli.signature_policy,
            format: cli.format,
            stdout: cli.stdout,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    telemetry::init_tracing(cli.verbose);

    let config = HookConfig::from(cli);
    match hook::run(&config, &DpkgIndex::new()) {
        Ok(outcome) => {
            if let Some(path) = outcome.path {
                ReportFormatter::new().print_written(&path);
            }
        }
        Err(err) => exit_with(err),
    }
}

fn exit_with(err: HookError) -> ! {
    eprintln!("{}", err.user_message());
    process::exit(err.exit_code());
}
