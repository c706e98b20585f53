//! Console input fed through a channel.

use std::io::BufRead;
use std::thread;

use crossbeam_channel::{unbounded, Receiver};
use tracing::debug;

/// Read lines from `reader` on a detached thread.
///
/// The channel disconnects at end of input or on a read error. The thread
/// is never joined, so a session can end while a read is still blocked.
#[must_use]
pub fn spawn_line_reader<R>(reader: R) -> Receiver<String>
where
    R: BufRead + Send + 'static,
{
    let (sender, receiver) = unbounded();
    let spawned = thread::Builder::new()
        .name("townhall-input".into())
        .spawn(move || {
            for line in reader.lines() {
                let Ok(line) = line else {
                    break;
                };
                if sender.send(line).is_err() {
                    break;
                }
            }
            debug!("input closed");
        });
    if let Err(e) = spawned {
        debug!(error = %e, "could not start the input thread");
    }
    receiver
}

/// Read lines from standard input.
#[must_use]
pub fn spawn_stdin_reader() -> Receiver<String> {
    spawn_line_reader(std::io::BufReader::new(std::io::stdin()))
}

/// Channel pre-filled with `lines` that disconnects once they are consumed.
#[must_use]
pub fn scripted<I, S>(lines: I) -> Receiver<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let (sender, receiver) = unbounded();
    for line in lines {
        let _ = sender.send(line.into());
    }
    receiver
}
