use crate::Position;
use crate::gameplay::game::Game;

/// A hand state frozen to disk, checksummed by its own content hash.
/// The watch loop saves one per decision point so a session can be
/// reopened or replayed after the fact.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Snapshot {
    digest: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    hero: Option<Position>,
    game: Game,
}

impl Snapshot {
    pub fn freeze(game: Game, hero: Option<Position>) -> Self {
        Self {
            digest: game.digest(),
            hero,
            game,
        }
    }

    pub fn digest(&self) -> u64 {
        self.digest
    }
    pub fn hero(&self) -> Option<Position> {
        self.hero
    }
    /// Filename stem for content-addressed storage.
    pub fn key(&self) -> String {
        format!("{:016x}", self.digest)
    }

    /// Give the game back, refusing a snapshot whose hash no longer
    /// matches what it carries.
    pub fn thaw(self) -> Result<(Game, Option<Position>), crate::Error> {
        match self.game.digest() == self.digest {
            true => Ok((self.game, self.hero)),
            false => Err(crate::Error::invariant(format!(
                "snapshot {} fails its checksum",
                self.key()
            ))),
        }
    }

    pub fn save(&self, path: &std::path::Path) -> std::io::Result<()> {
        log::info!("{:<32}{}", "saving snapshot", path.display());
        let ref mut file = std::fs::File::create(path)?;
        serde_json::to_writer(file, self).map_err(std::io::Error::other)
    }

    pub fn load(path: &std::path::Path) -> std::io::Result<Self> {
        log::info!("{:<32}{}", "loading snapshot", path.display());
        let ref mut file = std::fs::File::open(path)?;
        serde_json::from_reader(file).map_err(std::io::Error::other)
    }
}
