use tokio::sync::mpsc::{error::TryRecvError, Receiver, Sender};

#[cfg(unix)]
use tokio::signal::unix::signal;

#[derive(Debug, Clone)]
pub enum Interrupted {
    OsSigInt,
    UserInt,
}

#[cfg(unix)]
async fn terminate_by_unix_signal(terminator: Sender<Interrupted>) {
    let mut interrupt_signal = match signal(tokio::signal::unix::SignalKind::interrupt()) {
        Ok(s) => s,
        Err(e) => {
            tracing::warn!("could not install SIGINT handler: {e}");
            return;
        }
    };

    while interrupt_signal.recv().await.is_some() {
        if terminator.send(Interrupted::OsSigInt).await.is_err() {
            break;
        }
    }
}

#[cfg(not(unix))]
async fn terminate_by_ctrl_c(terminator: Sender<Interrupted>) {
    while tokio::signal::ctrl_c().await.is_ok() {
        if terminator.send(Interrupted::OsSigInt).await.is_err() {
            break;
        }
    }
}

// a channel that yields once per Ctrl+C, so bulk work can stop between items
pub fn create_termination() -> (Sender<Interrupted>, Receiver<Interrupted>) {
    let (tx, rx) = tokio::sync::mpsc::channel(1);

    #[cfg(unix)]
    tokio::spawn(terminate_by_unix_signal(tx.clone()));

    #[cfg(not(unix))]
    tokio::spawn(terminate_by_ctrl_c(tx.clone()));

    (tx, rx)
}

/// Non-blocking check used between the steps of a bulk operation.
pub fn interrupted(rx: &mut Receiver<Interrupted>) -> Option<Interrupted> {
    match rx.try_recv() {
        Ok(reason) => Some(reason),
        Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
    }
}
