use crate::errors::ExecutionError;
use crate::terminal;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers, read};
use std::sync::mpsc::{Receiver, Sender, channel};
use std::thread;

/// Single-consumer mailbox for keyboard input.
///
/// The producing side is either a background thread translating terminal key
/// events into bytes ([`Keyboard::spawn_terminal_reader`]) or a plain channel
/// sender under test. Each byte is delivered at most once, zero-extended to
/// a machine word.
pub struct Keyboard {
    receiver: Receiver<u16>,
}

impl Keyboard {
    pub const fn from_receiver(receiver: Receiver<u16>) -> Self {
        Self { receiver }
    }

    /// Starts the reader thread feeding the mailbox from the terminal.
    ///
    /// The thread ends when the mailbox is dropped. Ctrl+C restores the
    /// terminal state and terminates the process, since raw mode swallows
    /// the usual interrupt signal.
    #[must_use]
    pub fn spawn_terminal_reader() -> Self {
        let (sender, receiver) = channel();
        thread::spawn(move || run_reader(&sender));
        Self { receiver }
    }

    /// Non-blocking check for a pending byte, consuming it when present.
    pub fn poll(&mut self) -> Option<u16> {
        self.receiver.try_recv().ok()
    }

    /// Blocks until one byte is delivered.
    ///
    /// # Errors
    /// - the producing side is gone
    pub fn read_blocking(&mut self) -> Result<u16, ExecutionError> {
        self.receiver
            .recv()
            .map_err(|_| ExecutionError::KeyboardDisconnected)
    }
}

fn run_reader(sender: &Sender<u16>) {
    loop {
        let Ok(event) = read() else {
            return;
        };
        if let Some(key_event) = event.as_key_event()
            && let Some(byte) = key_event_to_byte(key_event)
            && sender.send(byte).is_err()
        {
            // mailbox dropped, emulator is gone
            return;
        }
    }
}

fn key_event_to_byte(event: KeyEvent) -> Option<u16> {
    if matches!(event.kind, KeyEventKind::Release) {
        return None;
    }
    // Raw mode disables SIGINT, handle the interrupt key ourselves
    if event.modifiers == KeyModifiers::CONTROL && event.code == KeyCode::Char('c') {
        terminal::restore_terminal();
        std::process::exit(130);
    }
    match event.code {
        KeyCode::Enter => Some(u16::from(b'\n')),
        KeyCode::Backspace => Some(0x08),
        KeyCode::Tab => Some(u16::from(b'\t')),
        KeyCode::Esc => Some(0x1B),
        KeyCode::Char(c) => u8::try_from(c).ok().map(u16::from),
        _ => None,
    }
}
