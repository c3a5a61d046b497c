use ratatui::style::Color;

/// Colors used by the board client, grouped by purpose.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    // ── Board ──────────────────────────────────────────────────────
    pub light_square: Color,
    pub dark_square: Color,
    pub white_piece: Color,
    pub black_piece: Color,
    pub board_border: Color,
    pub board_label: Color,
    pub cursor: Color,

    // ── Cell classes (light-square variant, dark-square variant) ──
    pub overlay_selected: (Color, Color),
    pub overlay_valid_move: (Color, Color),
    pub overlay_promotion: (Color, Color),

    // ── Status ────────────────────────────────────────────────────
    pub panel_border: Color,
    pub positive: Color,
    pub negative: Color,
    pub muted: Color,

    // ── Text ──────────────────────────────────────────────────────
    pub text_primary: Color,
    pub text_bright: Color,

    // ── Dialogs / notifications ───────────────────────────────────
    pub dialog_bg: Color,
    pub dialog_border: Color,
    pub dialog_highlight: Color,
    pub notification_border: Color,
}

impl Theme {
    /// For terminals with a dark background.
    pub fn dark() -> Self {
        Self {
            light_square: Color::Rgb(240, 217, 181),
            dark_square: Color::Rgb(181, 136, 99),
            // Explicit RGB: many terminals remap ANSI white/black.
            white_piece: Color::Rgb(255, 255, 255),
            black_piece: Color::Rgb(0, 0, 0),
            board_border: Color::Cyan,
            board_label: Color::Yellow,
            cursor: Color::Magenta,

            overlay_selected: (Color::LightYellow, Color::Yellow),
            overlay_valid_move: (Color::LightBlue, Color::Blue),
            overlay_promotion: (Color::LightMagenta, Color::Magenta),

            panel_border: Color::Cyan,
            positive: Color::Green,
            negative: Color::Red,
            muted: Color::DarkGray,

            text_primary: Color::White,
            text_bright: Color::White,

            dialog_bg: Color::Black,
            dialog_border: Color::Yellow,
            dialog_highlight: Color::Yellow,
            notification_border: Color::LightRed,
        }
    }

    /// For terminals with a light background. Darker squares so white
    /// pieces keep their contrast.
    pub fn light() -> Self {
        Self {
            light_square: Color::Rgb(210, 180, 140),
            dark_square: Color::Rgb(150, 110, 70),
            white_piece: Color::Rgb(255, 255, 255),
            black_piece: Color::Rgb(30, 30, 30),
            board_border: Color::Rgb(60, 60, 60),
            board_label: Color::Rgb(100, 80, 50),
            cursor: Color::Rgb(140, 50, 140),

            overlay_selected: (Color::Rgb(220, 200, 80), Color::Rgb(180, 160, 40)),
            overlay_valid_move: (Color::Rgb(100, 160, 220), Color::Rgb(60, 120, 180)),
            overlay_promotion: (Color::Rgb(200, 100, 220), Color::Rgb(160, 60, 180)),

            panel_border: Color::Rgb(60, 120, 140),
            positive: Color::Rgb(30, 140, 30),
            negative: Color::Rgb(200, 40, 40),
            muted: Color::Rgb(150, 150, 150),

            text_primary: Color::Rgb(30, 30, 30),
            text_bright: Color::Rgb(0, 0, 0),

            dialog_bg: Color::Rgb(245, 245, 240),
            dialog_border: Color::Rgb(160, 130, 30),
            dialog_highlight: Color::Rgb(160, 130, 30),
            notification_border: Color::Rgb(200, 40, 40),
        }
    }

    /// Set `EASYCHESS_THEME=light` for light terminals. Defaults to dark.
    pub fn detect() -> Self {
        Self::from_preference(std::env::var("EASYCHESS_THEME").ok().as_deref())
    }

    pub fn from_preference(pref: Option<&str>) -> Self {
        match pref {
            Some("light") => Self::light(),
            _ => Self::dark(),
        }
    }

    pub fn toggle(&mut self) {
        *self = if self.is_dark() {
            Self::light()
        } else {
            Self::dark()
        };
    }

    pub fn is_dark(&self) -> bool {
        self.text_primary == Color::White
    }

    pub fn square(&self, is_light_square: bool) -> Color {
        if is_light_square {
            self.light_square
        } else {
            self.dark_square
        }
    }

    pub fn resolve_overlay(&self, overlay: OverlayKind, is_light_square: bool) -> Color {
        let (light, dark) = match overlay {
            OverlayKind::Selected => self.overlay_selected,
            OverlayKind::ValidMove => self.overlay_valid_move,
            OverlayKind::Promotion => self.overlay_promotion,
        };
        if is_light_square {
            light
        } else {
            dark
        }
    }
}

/// Cell class overlays, strongest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayKind {
    Selected,
    Promotion,
    ValidMove,
}

impl Default for Theme {
    fn default() -> Self {
        Self::detect()
    }
}
