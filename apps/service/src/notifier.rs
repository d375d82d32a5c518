use std::io::{self, Write};

use chrono::Local;
use portwatch::{AlertNotifier, AlertSignal, LogNotifier};

const BELL: &str = "\x07";

/// Alerts the person at the terminal.
///
/// Every alert is logged and rings the bell; alerts raised by a command the
/// user just ran also print a one-line toast on stdout.
#[derive(Debug, Default)]
pub struct TerminalNotifier {
    log: LogNotifier,
}

impl TerminalNotifier {
    fn toast(signal: &AlertSignal) -> String {
        let checked_at = signal.checked_at.with_timezone(&Local).format("%H:%M:%S");
        format!("!! {} is unreachable (checked {checked_at})", signal.resource)
    }
}

impl AlertNotifier for TerminalNotifier {
    fn notify(&self, signal: &AlertSignal) {
        self.log.notify(signal);

        let mut stdout = io::stdout().lock();
        if signal.interactive {
            let _ = writeln!(stdout, "{}", Self::toast(signal));
        }
        let _ = write!(stdout, "{BELL}");
        let _ = stdout.flush();
    }
}
