use stata_runner_core::{Platform, StataCommand, command::DO_FILE_FLAGS};

/// Parts of a batch-mode Stata command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandBreakdown<'a> {
    pub executable: &'a str,
    pub script: Option<&'a str>,
    pub options: Vec<&'a str>,
    /// Explicit log name, only passed on Windows
    pub log_name: Option<&'a str>,
}

impl<'a> CommandBreakdown<'a> {
    pub fn from_command(command: &'a StataCommand, platform: &Platform) -> Self {
        let mut args = command.args.iter().map(String::as_str);
        let executable = args.next().unwrap_or("");

        let mut rest: Vec<&str> = args.collect();
        if rest.starts_with(&DO_FILE_FLAGS) {
            rest.drain(..DO_FILE_FLAGS.len());
        }

        let mut rest = rest.into_iter();
        let script = rest.next();
        let mut options: Vec<&str> = rest.collect();
        let log_name = if platform.requires_log_override() {
            options.pop().and_then(|last| last.strip_prefix('-'))
        } else {
            None
        };

        Self {
            executable,
            script,
            options,
            log_name,
        }
    }
}

pub fn print_command_breakdown(command: &StataCommand, platform: &Platform) {
    let breakdown = CommandBreakdown::from_command(command, platform);

    println!("   🔧 Command breakdown:");
    println!("      • command: {}", breakdown.executable);
    if let Some(script) = breakdown.script {
        println!("      • script: {}", script);
    }
    if !breakdown.options.is_empty() {
        println!("      • options: {:?}", breakdown.options);
    }
    if let Some(log_name) = breakdown.log_name {
        println!("      • log: {}.log", log_name);
    }
    if let Some(dir) = command.working_dir() {
        println!("      • cwd: {}", dir.display());
    }
}
