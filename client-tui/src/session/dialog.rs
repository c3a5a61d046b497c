//! Modal dialogs as awaitable, single-resolution requests.

use chess::PieceKind;
use thiserror::Error;
use tokio::sync::oneshot;

use crate::view::DialogPrompt;

/// A second dialog was requested while one is still open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("A dialog is already open")]
pub struct DialogConflict;

/// Resolves once the dialog it belongs to is answered or dismissed.
pub struct DialogTicket<T> {
    rx: oneshot::Receiver<T>,
}

impl<T> DialogTicket<T> {
    /// `None` if the dialog was dismissed without an answer.
    pub async fn resolved(self) -> Option<T> {
        self.rx.await.ok()
    }
}

enum OpenDialog {
    Promotion {
        options: Vec<PieceKind>,
        tx: oneshot::Sender<PieceKind>,
    },
    Confirmation {
        tx: oneshot::Sender<bool>,
    },
}

/// Holds at most one open dialog. Resolving takes the sender out, so any
/// later answer for the same dialog finds nothing to resolve.
#[derive(Default)]
pub struct DialogBridge {
    open: Option<OpenDialog>,
    prompt: Option<DialogPrompt>,
}

impl DialogBridge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request_promotion(
        &mut self,
        options: &[PieceKind],
    ) -> Result<DialogTicket<PieceKind>, DialogConflict> {
        self.ensure_closed()?;
        let (tx, rx) = oneshot::channel();
        self.open = Some(OpenDialog::Promotion {
            options: options.to_vec(),
            tx,
        });
        self.prompt = Some(DialogPrompt::Promotion {
            options: options.to_vec(),
        });
        Ok(DialogTicket { rx })
    }

    pub fn request_confirmation(
        &mut self,
        header: impl Into<String>,
        message: impl Into<String>,
    ) -> Result<DialogTicket<bool>, DialogConflict> {
        self.ensure_closed()?;
        let (tx, rx) = oneshot::channel();
        self.open = Some(OpenDialog::Confirmation { tx });
        self.prompt = Some(DialogPrompt::Confirmation {
            header: header.into(),
            message: message.into(),
        });
        Ok(DialogTicket { rx })
    }

    /// Resolve an open promotion dialog. Kinds not offered are ignored.
    pub fn choose_piece(&mut self, kind: PieceKind) -> bool {
        match self.open.take() {
            Some(OpenDialog::Promotion { options, tx }) if options.contains(&kind) => {
                self.prompt = None;
                let _ = tx.send(kind);
                true
            }
            other => {
                self.open = other;
                false
            }
        }
    }

    /// Resolve an open confirmation dialog.
    pub fn answer(&mut self, confirmed: bool) -> bool {
        match self.open.take() {
            Some(OpenDialog::Confirmation { tx }) => {
                self.prompt = None;
                let _ = tx.send(confirmed);
                true
            }
            other => {
                self.open = other;
                false
            }
        }
    }

    /// Close whatever is open; its ticket resolves to `None`.
    pub fn dismiss(&mut self) -> bool {
        self.prompt = None;
        self.open.take().is_some()
    }

    pub fn prompt(&self) -> Option<&DialogPrompt> {
        self.prompt.as_ref()
    }

    pub fn is_open(&self) -> bool {
        self.open.is_some()
    }

    fn ensure_closed(&self) -> Result<(), DialogConflict> {
        if self.is_open() {
            Err(DialogConflict)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn resolves_exactly_once() {
        let mut bridge = DialogBridge::new();
        let ticket = bridge.request_confirmation("Resign", "Sure?").unwrap();
        assert!(bridge.is_open());

        assert!(bridge.answer(true));
        assert!(!bridge.answer(false));
        assert!(bridge.prompt().is_none());
        assert_eq!(ticket.resolved().await, Some(true));
    }

    #[tokio::test]
    async fn second_dialog_is_a_conflict() {
        let mut bridge = DialogBridge::new();
        let _ticket = bridge.request_promotion(&PieceKind::PROMOTIONS).unwrap();
        assert!(matches!(
            bridge.request_confirmation("Draw offered", "Accept?"),
            Err(DialogConflict)
        ));
        assert!(matches!(
            bridge.prompt(),
            Some(DialogPrompt::Promotion { .. })
        ));
    }

    #[tokio::test]
    async fn wrong_answer_kind_keeps_dialog_open() {
        let mut bridge = DialogBridge::new();
        let ticket = bridge.request_promotion(&[PieceKind::Queen, PieceKind::Knight]).unwrap();

        assert!(!bridge.answer(true));
        assert!(!bridge.choose_piece(PieceKind::King));
        assert!(bridge.is_open());

        assert!(bridge.choose_piece(PieceKind::Knight));
        assert_eq!(ticket.resolved().await, Some(PieceKind::Knight));
    }

    #[tokio::test]
    async fn dismissed_ticket_resolves_to_none() {
        let mut bridge = DialogBridge::new();
        let ticket = bridge.request_confirmation("Offer draw", "Offer?").unwrap();
        assert!(bridge.dismiss());
        assert!(!bridge.dismiss());
        assert_eq!(ticket.resolved().await, None);
    }
}
