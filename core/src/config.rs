use serde::{Deserialize, Serialize};

use crate::*;

/// Elapsed-time cap; reaching it ends the game as a loss.
pub const DEFAULT_MAX_SECONDS: u16 = 999;

/// Classic expert density, 99 mines on a 16x30 board (about 0.206).
pub const DEFAULT_MINE_DENSITY: f64 = 99.0 / (16.0 * 30.0);

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    pub size: Coord2,
    pub mines: CellCount,
}

impl GameConfig {
    pub const fn new_unchecked(size: Coord2, mines: CellCount) -> Self {
        Self { size, mines }
    }

    /// Validated constructor: both dimensions positive and `0 < mines < rows * cols`.
    pub fn new(size: Coord2, mines: CellCount) -> Result<Self> {
        let config = Self::new_unchecked(size, mines);
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let (rows, cols) = self.size;
        if rows == 0 || cols == 0 {
            return Err(GameError::EmptyBoard);
        }
        if self.mines == 0 {
            return Err(GameError::NoMines);
        }
        if self.mines >= self.total_cells() {
            return Err(GameError::TooManyMines);
        }
        Ok(())
    }

    pub const fn rows(&self) -> Coord {
        self.size.0
    }

    pub const fn cols(&self) -> Coord {
        self.size.1
    }

    pub const fn total_cells(&self) -> CellCount {
        mult(self.size.0, self.size.1)
    }

    pub const fn safe_cells(&self) -> CellCount {
        self.total_cells().saturating_sub(self.mines)
    }

    pub fn contains(&self, (row, col): Coord2) -> bool {
        row < self.size.0 && col < self.size.1
    }

    pub fn validate_coords(&self, coords: Coord2) -> Result<Coord2> {
        if self.contains(coords) {
            Ok(coords)
        } else {
            Err(GameError::InvalidCoords)
        }
    }
}

/// Board size picked for viewports at least `min_width` wide.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoardPreset {
    pub id: String,
    pub rows: Coord,
    pub cols: Coord,
    pub min_width: u32,
}

impl BoardPreset {
    pub fn new(id: impl Into<String>, rows: Coord, cols: Coord, min_width: u32) -> Self {
        Self {
            id: id.into(),
            rows,
            cols,
            min_width,
        }
    }
}

/// Immutable engine settings handed to session construction.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub mine_density: f64,
    pub max_seconds: u16,
    pub presets: Vec<BoardPreset>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            mine_density: DEFAULT_MINE_DENSITY,
            max_seconds: DEFAULT_MAX_SECONDS,
            presets: vec![
                BoardPreset::new("mobile-xs", 9, 9, 0),
                BoardPreset::new("mobile-s", 10, 16, 480),
                BoardPreset::new("tablet", 12, 20, 768),
                BoardPreset::new("desktop-s", 12, 30, 1024),
                BoardPreset::new("desktop-m", 14, 30, 1440),
                BoardPreset::new("desktop-l", 16, 30, 1920),
            ],
        }
    }
}

impl Settings {
    /// Parses and validates a TOML settings document. Missing keys take their defaults.
    pub fn from_toml_str(source: &str) -> core::result::Result<Self, ConfigError> {
        let settings: Self = toml::from_str(source)?;
        settings.validate()?;
        log::debug!(
            "loaded settings: {} presets, density {}, max {}s",
            settings.presets.len(),
            settings.mine_density,
            settings.max_seconds
        );
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.mine_density > 0.0 && self.mine_density < 1.0) {
            return Err(GameError::InvalidDensity);
        }
        if self.max_seconds == 0 {
            return Err(GameError::InvalidMaxTime);
        }
        if !self.presets.iter().any(|preset| preset.min_width == 0) {
            return Err(GameError::NoPresets);
        }
        for preset in &self.presets {
            self.config_for_preset(preset).validate()?;
        }
        Ok(())
    }

    /// Largest preset whose width threshold is met by `width`.
    pub fn preset_for_width(&self, width: u32) -> Option<&BoardPreset> {
        self.presets
            .iter()
            .filter(|preset| preset.min_width <= width)
            .max_by_key(|preset| preset.min_width)
    }

    pub fn config_for_width(&self, width: u32) -> Result<GameConfig> {
        let preset = self.preset_for_width(width).ok_or(GameError::NoPresets)?;
        let config = self.config_for_preset(preset);
        config.validate()?;
        Ok(config)
    }

    /// Applies the density to a preset: `round(density * rows * cols)`, at least one mine and never a full board.
    pub fn config_for_preset(&self, preset: &BoardPreset) -> GameConfig {
        let total = mult(preset.rows, preset.cols);
        let wanted = (self.mine_density * f64::from(total)).round();
        let mines = if wanted >= f64::from(CellCount::MAX) {
            CellCount::MAX
        } else {
            wanted as CellCount
        };
        let mines = mines.max(1).min(total.saturating_sub(1));
        GameConfig::new_unchecked((preset.rows, preset.cols), mines)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_rejects_degenerate_boards() {
        assert_eq!(GameConfig::new((0, 5), 1), Err(GameError::EmptyBoard));
        assert_eq!(GameConfig::new((5, 0), 1), Err(GameError::EmptyBoard));
        assert_eq!(GameConfig::new((3, 3), 0), Err(GameError::NoMines));
        assert_eq!(GameConfig::new((3, 3), 9), Err(GameError::TooManyMines));
        assert!(GameConfig::new((3, 3), 8).is_ok());
    }

    #[test]
    fn validate_coords_rejects_out_of_range() {
        let config = GameConfig::new((2, 3), 1).unwrap();
        assert_eq!(config.validate_coords((1, 2)), Ok((1, 2)));
        assert_eq!(config.validate_coords((2, 0)), Err(GameError::InvalidCoords));
        assert_eq!(config.validate_coords((0, 3)), Err(GameError::InvalidCoords));
    }

    #[test]
    fn picks_largest_preset_meeting_threshold() {
        let settings = Settings::default();
        assert_eq!(settings.preset_for_width(0).unwrap().id, "mobile-xs");
        assert_eq!(settings.preset_for_width(479).unwrap().id, "mobile-xs");
        assert_eq!(settings.preset_for_width(480).unwrap().id, "mobile-s");
        assert_eq!(settings.preset_for_width(1100).unwrap().id, "desktop-s");
        assert_eq!(settings.preset_for_width(4000).unwrap().id, "desktop-l");
    }

    #[test]
    fn density_is_rounded_with_one_mine_minimum() {
        let settings = Settings::default();
        let expert = settings.config_for_width(1920).unwrap();
        assert_eq!(expert, GameConfig::new_unchecked((16, 30), 99));

        let sparse = Settings {
            mine_density: 0.001,
            ..Settings::default()
        };
        assert_eq!(sparse.config_for_width(0).unwrap().mines, 1);
    }

    #[test]
    fn default_settings_are_valid() {
        assert_eq!(Settings::default().validate(), Ok(()));
    }

    #[test]
    fn default_density_fills_expert_board() {
        let settings = Settings::default();
        let expert = settings.config_for_width(1920).unwrap();
        assert_eq!(expert.size, (16, 30));
        assert_eq!(expert.mines, 99);

        let small = settings.config_for_width(0).unwrap();
        assert_eq!(small.size, (9, 9));
        assert_eq!(small.mines, 17);
    }

    #[test]
    fn parses_partial_toml_with_defaults() {
        let settings = Settings::from_toml_str(
            r#"
            max_seconds = 120

            [[presets]]
            id = "tiny"
            rows = 5
            cols = 5
            min_width = 0
            "#,
        )
        .unwrap();

        assert_eq!(settings.max_seconds, 120);
        assert_eq!(settings.mine_density, DEFAULT_MINE_DENSITY);
        assert_eq!(settings.presets, vec![BoardPreset::new("tiny", 5, 5, 0)]);
    }

    #[test]
    fn rejects_table_without_catch_all_preset() {
        let result = Settings::from_toml_str(
            r#"
            [[presets]]
            id = "wide"
            rows = 9
            cols = 9
            min_width = 800
            "#,
        );
        assert!(matches!(
            result,
            Err(ConfigError::Invalid(GameError::NoPresets))
        ));
    }

    #[test]
    fn rejects_malformed_toml() {
        assert!(matches!(
            Settings::from_toml_str("mine_density = \"lots\""),
            Err(ConfigError::Parse(_))
        ));
    }
}
