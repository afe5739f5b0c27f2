use clap::{Parser, Subcommand};

#[derive(Parser, Debug, Clone)]
#[command(name = "bosque-kernel", about = "Jupyter kernel adapter for the Bosque language", version)]
pub struct Cli {
    /// Bosque compiler command or path (overrides config).
    #[arg(long)]
    pub bosque_command: Option<String>,

    /// Node.js command or path (overrides config).
    #[arg(long)]
    pub node_command: Option<String>,

    /// Execution timeout in seconds (overrides config).
    #[arg(long)]
    pub timeout: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Compile and execute one Bosque source file, printing the result.
    Run {
        /// Source file, or '-' to read from stdin.
        #[arg(value_name = "FILE")]
        file: String,
    },
    /// Serve execution requests for a kernel-protocol host over stdio.
    ///
    /// One JSON request per stdin line ({"code": "..."}), one JSON outcome
    /// per stdout line. SIGINT interrupts the in-flight cell.
    Serve {
        /// Connection file passed by the Jupyter launcher; the wire
        /// protocol is handled by the host, so this is accepted and ignored.
        #[arg(long = "connection-file", short = 'f')]
        connection_file: Option<String>,
    },
    /// Install the Jupyter kernelspec for this binary.
    Install {
        /// Install into the per-user kernels directory instead of the
        /// system-wide one.
        #[arg(long)]
        user: bool,
    },
    /// Dump highlighting tokens for a Bosque source file.
    Highlight {
        #[arg(value_name = "FILE")]
        file: String,
    },
}
