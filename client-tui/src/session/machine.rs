//! Local interaction state: square selection, promotion choice, confirmations.
//!
//! The machine is pure. It consumes an [`Input`] together with the current
//! authoritative [`GameState`] and answers with the [`Effect`]s the session
//! controller has to carry out. Anything asynchronous (move queries, requests,
//! dialogs) comes back later as another `Input`.

use chess::{Color, GameState, Move, PieceKind, Square};
use chess_client::{ClientError, GameOver, PlayerRole, Request};

use super::error::InteractionError;
use crate::view::Notification;

/// A selected square and the legal moves the server returned for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub square: Square,
    pub candidates: Vec<Move>,
}

impl Selection {
    /// First candidate landing on `to`.
    pub fn move_to(&self, to: Square) -> Option<&Move> {
        self.candidates.iter().find(|mv| mv.to == to)
    }

    pub fn requires_promotion(&self, to: Square) -> bool {
        self.candidates
            .iter()
            .any(|mv| mv.to == to && mv.is_promotion())
    }

    pub fn destinations(&self) -> Vec<Square> {
        let mut squares: Vec<Square> = self.candidates.iter().map(|mv| mv.to).collect();
        squares.sort();
        squares.dedup();
        squares
    }
}

/// What a confirmation dialog is asking about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmKind {
    /// Local player pressed resign.
    Resign,
    /// Local player wants to offer a draw.
    OfferDraw,
    /// Opponent offered a draw.
    AnswerDraw,
}

impl ConfirmKind {
    pub fn header(self) -> &'static str {
        match self {
            Self::Resign => "Resign",
            Self::OfferDraw => "Offer draw",
            Self::AnswerDraw => "Draw offered",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Self::Resign => "Are you sure you want to resign?",
            Self::OfferDraw => "Offer your opponent a draw?",
            Self::AnswerDraw => "Your opponent offers a draw. Accept?",
        }
    }

    /// Request sent once the dialog resolves. A dismissed draw offer counts
    /// as a refusal so the opponent is never left waiting.
    pub fn request(self, answer: Option<bool>) -> Option<Request> {
        match (self, answer) {
            (Self::Resign, Some(true)) => Some(Request::Resign),
            (Self::OfferDraw, Some(true)) => Some(Request::RequestDraw),
            (Self::AnswerDraw, Some(true)) => Some(Request::AcceptDraw),
            (Self::AnswerDraw, _) => Some(Request::DenyDraw),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum InteractionState {
    #[default]
    Idle,
    Selected(Selection),
    AwaitingPromotion { from: Square, to: Square },
    AwaitingConfirmation(ConfirmKind),
    Ended,
}

impl InteractionState {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Selected(_) => "selected",
            Self::AwaitingPromotion { .. } => "awaiting_promotion",
            Self::AwaitingConfirmation(_) => "awaiting_confirmation",
            Self::Ended => "ended",
        }
    }

    pub fn has_dialog(&self) -> bool {
        matches!(
            self,
            Self::AwaitingPromotion { .. } | Self::AwaitingConfirmation(_)
        )
    }
}

/// Identifies one valid-moves query. A reply is only applied if its ticket is
/// still the outstanding one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryTicket {
    pub square: Square,
    pub epoch: u64,
}

#[derive(Debug)]
pub enum Input {
    CellClicked(Square),
    ResignPressed,
    DrawPressed,
    MovesLoaded {
        ticket: QueryTicket,
        result: Result<Vec<Move>, InteractionError>,
    },
    /// `None` when the dialog was dismissed without a choice.
    PromotionChosen(Option<PieceKind>),
    ConfirmationResolved(Option<bool>),
    /// The store took a new snapshot.
    StateReplaced,
    DrawRequested { by: Color },
    GameOver(GameOver),
    RequestSettled {
        request: Request,
        result: Result<(), ClientError>,
    },
    Disconnected,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    QueryMoves(QueryTicket),
    Send(Request),
    OpenPromotion { from: Square, to: Square },
    OpenConfirmation(ConfirmKind),
    CloseDialog,
    Notify(Notification),
    AnnounceResult(GameOver),
    /// Carries the result if the game had already ended.
    ConnectionLost(Option<GameOver>),
}

pub struct InteractionMachine {
    state: InteractionState,
    player: Color,
    role: PlayerRole,
    epoch: u64,
    pending_query: Option<QueryTicket>,
    result: Option<GameOver>,
    connected: bool,
}

impl InteractionMachine {
    pub fn new(player: Color, role: PlayerRole) -> Self {
        Self {
            state: InteractionState::Idle,
            player,
            role,
            epoch: 0,
            pending_query: None,
            result: None,
            connected: true,
        }
    }

    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    pub fn selection(&self) -> Option<&Selection> {
        match self.state {
            InteractionState::Selected(ref selection) => Some(selection),
            _ => None,
        }
    }

    pub fn pending_query(&self) -> Option<QueryTicket> {
        self.pending_query
    }

    pub fn is_ended(&self) -> bool {
        self.state == InteractionState::Ended
    }

    pub fn handle(&mut self, input: Input, game: &GameState) -> Vec<Effect> {
        // The view must be blanked on disconnect even after the game ended.
        if let Input::Disconnected = input {
            return self.on_disconnect();
        }
        if self.is_ended() {
            tracing::trace!(?input, "Session ended, input ignored");
            return Vec::new();
        }

        let before = self.state.name();
        let effects = match input {
            Input::CellClicked(square) => self.on_click(square, game),
            Input::ResignPressed => self.open_confirmation(ConfirmKind::Resign),
            Input::DrawPressed => self.open_confirmation(ConfirmKind::OfferDraw),
            Input::MovesLoaded { ticket, result } => self.on_moves_loaded(ticket, result),
            Input::PromotionChosen(choice) => self.on_promotion(choice),
            Input::ConfirmationResolved(answer) => self.on_confirmation(answer),
            Input::StateReplaced => {
                self.invalidate_query();
                if let InteractionState::Selected(_) = self.state {
                    self.state = InteractionState::Idle;
                }
                Vec::new()
            }
            Input::DrawRequested { by } => self.on_draw_requested(by),
            Input::GameOver(over) => {
                tracing::info!(reason = ?over.reason, winner = ?over.winner, "Game over");
                let mut effects = self.end();
                self.result = Some(over.clone());
                effects.push(Effect::AnnounceResult(over));
                effects
            }
            Input::RequestSettled { request, result } => match result {
                Ok(()) => {
                    tracing::debug!(event = request.event(), "Request acknowledged");
                    Vec::new()
                }
                Err(source) => {
                    let err = InteractionError::from_request(request, source);
                    tracing::warn!("{}", err);
                    vec![Effect::Notify(err.notification())]
                }
            },
            Input::Disconnected => self.on_disconnect(),
        };

        if before != self.state.name() {
            tracing::debug!(from = before, to = self.state.name(), "Interaction transition");
        }
        effects
    }

    fn on_click(&mut self, square: Square, game: &GameState) -> Vec<Effect> {
        if self.role == PlayerRole::Spectator {
            return Vec::new();
        }

        match std::mem::take(&mut self.state) {
            InteractionState::Idle => self.select(square, game),
            InteractionState::Selected(selection) => match selection.move_to(square) {
                Some(_) if selection.requires_promotion(square) => {
                    self.state = InteractionState::AwaitingPromotion {
                        from: selection.square,
                        to: square,
                    };
                    vec![Effect::OpenPromotion {
                        from: selection.square,
                        to: square,
                    }]
                }
                Some(mv) => vec![Effect::Send(Request::MakeMove(*mv))],
                None => self.select(square, game),
            },
            dialog @ (InteractionState::AwaitingPromotion { .. }
            | InteractionState::AwaitingConfirmation(_)) => {
                tracing::debug!(%square, "Board click ignored while a dialog is open");
                self.state = dialog;
                Vec::new()
            }
            InteractionState::Ended => {
                self.state = InteractionState::Ended;
                Vec::new()
            }
        }
    }

    /// The idle selection rule. Any outstanding query is superseded.
    fn select(&mut self, square: Square, game: &GameState) -> Vec<Effect> {
        self.invalidate_query();
        if !game.board.is_occupied_by(square, self.player) {
            return Vec::new();
        }
        let ticket = QueryTicket {
            square,
            epoch: self.epoch,
        };
        self.pending_query = Some(ticket);
        vec![Effect::QueryMoves(ticket)]
    }

    fn on_moves_loaded(
        &mut self,
        ticket: QueryTicket,
        result: Result<Vec<Move>, InteractionError>,
    ) -> Vec<Effect> {
        if self.pending_query != Some(ticket) {
            tracing::debug!(square = %ticket.square, epoch = ticket.epoch, "Dropping stale move query reply");
            return Vec::new();
        }
        self.pending_query = None;

        match result {
            Ok(candidates) if candidates.is_empty() => {
                tracing::debug!(square = %ticket.square, "No legal moves");
                Vec::new()
            }
            Ok(candidates) => {
                self.state = InteractionState::Selected(Selection {
                    square: ticket.square,
                    candidates,
                });
                Vec::new()
            }
            Err(err) => vec![Effect::Notify(err.notification())],
        }
    }

    fn on_promotion(&mut self, choice: Option<PieceKind>) -> Vec<Effect> {
        let InteractionState::AwaitingPromotion { from, to } = self.state else {
            return Vec::new();
        };
        self.state = InteractionState::Idle;
        match choice {
            Some(kind) => vec![Effect::Send(Request::MakeMove(
                Move::new(from, to).with_promotion(kind),
            ))],
            None => Vec::new(),
        }
    }

    fn on_confirmation(&mut self, answer: Option<bool>) -> Vec<Effect> {
        let InteractionState::AwaitingConfirmation(kind) = self.state else {
            return Vec::new();
        };
        self.state = InteractionState::Idle;
        kind.request(answer).map(Effect::Send).into_iter().collect()
    }

    fn on_draw_requested(&mut self, by: Color) -> Vec<Effect> {
        if self.role == PlayerRole::Spectator || by == self.player {
            return Vec::new();
        }
        if self.state.has_dialog() {
            tracing::warn!(by = %by, state = self.state.name(), "Draw request dropped, a dialog is already open");
            return Vec::new();
        }
        self.open_confirmation(ConfirmKind::AnswerDraw)
    }

    fn open_confirmation(&mut self, kind: ConfirmKind) -> Vec<Effect> {
        if self.role == PlayerRole::Spectator {
            return Vec::new();
        }
        if self.state.has_dialog() {
            tracing::debug!(?kind, "Confirmation ignored while a dialog is open");
            return Vec::new();
        }
        self.invalidate_query();
        self.state = InteractionState::AwaitingConfirmation(kind);
        vec![Effect::OpenConfirmation(kind)]
    }

    fn on_disconnect(&mut self) -> Vec<Effect> {
        if !self.connected {
            return Vec::new();
        }
        self.connected = false;
        tracing::info!(ended = self.is_ended(), "Transport disconnected");
        let mut effects = self.end();
        effects.push(Effect::ConnectionLost(self.result.clone()));
        effects
    }

    fn end(&mut self) -> Vec<Effect> {
        self.invalidate_query();
        let had_dialog = self.state.has_dialog();
        self.state = InteractionState::Ended;
        if had_dialog {
            vec![Effect::CloseDialog]
        } else {
            Vec::new()
        }
    }

    fn invalidate_query(&mut self) {
        self.epoch += 1;
        self.pending_query = None;
    }
}
