//! Host folder dialogs.
//!
//! Each platform gets a helper program that prints the chosen directory on
//! stdout: PowerShell's `FolderBrowserDialog` on Windows, `osascript` on macOS
//! and `zenity` or `kdialog` on Linux desktops. When none applies the session
//! gets [`UnavailablePicker`].

use std::ffi::OsString;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};

use vault_core::{FolderPicker, PickerError, PickerOutcome, UnavailablePicker};

const DIALOG_TITLE: &str = "Select vault folder";

const POWERSHELL_SCRIPT: &str = "[void][Reflection.Assembly]::LoadWithPartialName('System.Windows.Forms');\
$dialog=New-Object System.Windows.Forms.FolderBrowserDialog;\
$dialog.Description='Select vault folder';\
$dialog.ShowNewFolderButton=$true;\
if($dialog.ShowDialog() -eq [System.Windows.Forms.DialogResult]::OK){[Console]::Out.Write($dialog.SelectedPath)}";

/// Folder picker backed by an external dialog program.
#[derive(Debug, Clone)]
pub struct SystemPicker {
    program: PathBuf,
    args: Vec<OsString>,
    /// Exit status 1 means the user closed the dialog (zenity, kdialog, osascript).
    exit_one_cancels: bool,
}

impl SystemPicker {
    /// Create a picker that runs `program` with `args`.
    pub fn new<I, S>(program: impl Into<PathBuf>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            exit_one_cancels: false,
        }
    }

    /// Treat exit status 1 as a cancelled dialog.
    pub fn exit_one_cancels(mut self, cancels: bool) -> Self {
        self.exit_one_cancels = cancels;
        self
    }

    /// Find a dialog program for this host.
    pub fn for_host() -> Option<Self> {
        if cfg!(windows) {
            let program = which::which("powershell").ok()?;
            return Some(Self::new(
                program,
                ["-NoProfile", "-NonInteractive", "-Command", POWERSHELL_SCRIPT],
            ));
        }

        if cfg!(target_os = "macos") {
            let program = which::which("osascript").ok()?;
            let script = format!("POSIX path of (choose folder with prompt \"{DIALOG_TITLE}\")");
            return Some(Self::new(program, ["-e".to_string(), script]).exit_one_cancels(true));
        }

        if std::env::var_os("DISPLAY").is_none() && std::env::var_os("WAYLAND_DISPLAY").is_none() {
            tracing::debug!("No graphical session, folder picker unavailable");
            return None;
        }

        if let Ok(program) = which::which("zenity") {
            let title = format!("--title={DIALOG_TITLE}");
            return Some(
                Self::new(program, ["--file-selection".to_string(), "--directory".to_string(), title])
                    .exit_one_cancels(true),
            );
        }

        if let Ok(program) = which::which("kdialog") {
            let start = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
            let args: Vec<OsString> = vec![
                "--title".into(),
                DIALOG_TITLE.into(),
                "--getexistingdirectory".into(),
                start.into_os_string(),
            ];
            return Some(Self::new(program, args).exit_one_cancels(true));
        }

        None
    }

    fn interpret(&self, output: Output) -> Result<PickerOutcome, PickerError> {
        let selected = String::from_utf8_lossy(&output.stdout).trim().to_string();

        if !output.status.success() {
            if self.exit_one_cancels && output.status.code() == Some(1) {
                return Ok(PickerOutcome::Cancelled);
            }
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let detail = if stderr.is_empty() {
                output.status.to_string()
            } else {
                stderr
            };
            return Err(PickerError::Launch(detail));
        }

        if selected.is_empty() {
            Ok(PickerOutcome::Cancelled)
        } else {
            Ok(PickerOutcome::Selected(PathBuf::from(selected)))
        }
    }
}

impl FolderPicker for SystemPicker {
    fn pick_folder(&self) -> Result<PickerOutcome, PickerError> {
        tracing::debug!("Launching folder picker {:?}", self.program);

        let output = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| PickerError::Launch(format!("{}: {}", self.program.display(), e)))?;

        let outcome = self.interpret(output)?;
        tracing::debug!("Folder picker returned {:?}", outcome);
        Ok(outcome)
    }
}

/// Pick the best folder picker for this host.
pub fn detect() -> Box<dyn FolderPicker> {
    match SystemPicker::for_host() {
        Some(picker) => {
            tracing::info!("Using folder picker {:?}", picker.program);
            Box::new(picker)
        }
        None => {
            tracing::info!("No folder picker for {}", std::env::consts::OS);
            Box::new(UnavailablePicker)
        }
    }
}
