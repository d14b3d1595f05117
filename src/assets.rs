//! Sprite resources and their asynchronous loading.
//!
//! This module contains the sprite file format, the manifest mapping resource keys onto sprite
//! files and the [`ResourceSet`], which loads every sprite of the manifest on background threads
//! and reports once, on the event-loop thread, when all of them have resolved.

use std::{
    collections::BTreeMap,
    fmt, fs,
    path::{Path, PathBuf},
    str::FromStr,
    sync::mpsc::{channel, Receiver, Sender, TryRecvError},
    thread,
};

use color_eyre::eyre::{bail, eyre, OptionExt as _, Result, WrapErr as _};
use ratatui::style::Color;
use tracing::{debug, error, info, warn};

use crate::types::TileType;

/// Identifier of an image resource.
///
/// Every tile type has its own key and the character has a reserved one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) enum ResourceKey {
    /// Sprite of a tile type.
    Tile(TileType),
    /// Sprite of the character.
    Character,
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tile(tile) => write!(formatter, "tile {tile:?} (code {})", tile.code()),
            Self::Character => formatter.write_str("character"),
        }
    }
}

/// A decoded image resource: a glyph painted with a foreground and a background colour.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Sprite {
    /// Character painted on every cell covered by the sprite.
    pub(crate) glyph: char,
    /// Colour of the glyph.
    pub(crate) fg: Color,
    /// Colour behind the glyph.
    pub(crate) bg: Color,
}

impl FromStr for Sprite {
    type Err = color_eyre::Report;

    /// Parses a sprite file.
    ///
    /// The first line that is neither blank nor a `#` comment must read `<glyph> <fg> [bg]`, where
    /// the glyph is a single character and the colours are anything [`Color`] can parse. The
    /// background defaults to [`Color::Reset`].
    fn from_str(input: &str) -> Result<Self> {
        let line = input
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty() && !line.starts_with('#'))
            .ok_or_eyre("sprite file holds no sprite line")?;

        let mut fields = line.split_whitespace();
        let glyph_field = fields.next().ok_or_eyre("sprite line has no glyph")?;
        let mut glyph_chars = glyph_field.chars();
        let (Some(glyph), None) = (glyph_chars.next(), glyph_chars.next()) else {
            bail!("sprite glyph {glyph_field:?} is not a single character");
        };

        let fg = parse_color(fields.next().ok_or_eyre("sprite line has no foreground colour")?)?;
        let bg = fields.next().map_or(Ok(Color::Reset), parse_color)?;
        if let Some(extra) = fields.next() {
            bail!("unexpected trailing field {extra:?} in sprite line");
        }

        Ok(Self { glyph, fg, bg })
    }
}

/// Parses a colour field of a sprite line.
fn parse_color(field: &str) -> Result<Color> {
    Color::from_str(field).map_err(|err| eyre!("invalid colour {field:?}: {err}"))
}

/// Mapping from resource keys onto sprite file names.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Manifest {
    /// Sprite file name of each registered key, relative to the assets directory.
    entries: BTreeMap<ResourceKey, PathBuf>,
}

impl Default for Manifest {
    fn default() -> Self {
        Self::from_entries([
            (ResourceKey::Tile(TileType::Ladder), "ladder.sprite"),
            (ResourceKey::Tile(TileType::Walkable), "floor.sprite"),
            (ResourceKey::Tile(TileType::Unwalkable), "wall.sprite"),
            (ResourceKey::Character, "character.sprite"),
        ])
    }
}

impl Manifest {
    /// Builds a manifest from key and file name pairs.
    pub(crate) fn from_entries<I, P>(entries: I) -> Self
    where
        I: IntoIterator<Item = (ResourceKey, P)>,
        P: Into<PathBuf>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(key, path)| (key, path.into()))
                .collect(),
        }
    }

    /// Iterates over the registered keys in key order.
    pub(crate) fn keys(&self) -> impl Iterator<Item = ResourceKey> + '_ {
        self.entries.keys().copied()
    }
}

/// Load state of a single resource.
#[derive(Clone, Debug, PartialEq, Eq)]
enum LoadState {
    /// Still waiting for its loader.
    Pending,
    /// Loaded and ready to draw.
    Loaded(Sprite),
    /// The loader reported an error.
    Failed,
}

/// Answer to a resource lookup at draw time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ResourceLookup<'res> {
    /// The sprite is loaded.
    Ready(&'res Sprite),
    /// The sprite has not finished loading.
    Pending,
    /// The sprite failed to load.
    Failed,
    /// No sprite is registered for the key.
    Missing,
}

/// Outcome sent by a loader thread.
pub(crate) type LoadOutcome = (ResourceKey, Result<Sprite>);

/// Totals reported once every resource has resolved.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct LoadSummary {
    /// Number of resources that loaded.
    pub(crate) loaded: usize,
    /// Number of resources that failed.
    pub(crate) failed: usize,
}

/// Set of image resources being loaded or already loaded.
///
/// Loading is a join over one completion signal per resource. Each slot resolves exactly once,
/// either to a sprite or to a failure, and failures count towards completion like successes do.
/// Outcomes arrive through a channel and are only ever applied on the thread calling
/// [`poll`](ResourceSet::poll), which is the event-loop thread.
pub(crate) struct ResourceSet {
    /// State of every registered resource.
    ///
    /// This field has one entry per manifest key. An entry leaves [`LoadState::Pending`] at most
    /// once and is never changed afterwards.
    slots: BTreeMap<ResourceKey, LoadState>,
    /// Receiving end of the loaders' outcome channel.
    ///
    /// This field is drained without blocking on every poll. Once every loader has dropped its
    /// sender the channel reports a disconnection and the remaining slots fail.
    outcomes: Receiver<LoadOutcome>,
    /// Number of slots no longer pending.
    resolved: usize,
    /// This field indicates whether the completion has already been reported by
    /// [`poll`](ResourceSet::poll). It starts `false` and is set once, together with the only
    /// summary ever returned.
    completion_reported: bool,
}

impl fmt::Debug for ResourceSet {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("ResourceSet")
            .field("slots", &self.slots)
            .field("resolved", &self.resolved)
            .field("completion_reported", &self.completion_reported)
            .finish_non_exhaustive()
    }
}

impl ResourceSet {
    /// Starts loading every sprite of the manifest from the assets directory.
    ///
    /// One loader thread is spawned per manifest entry; each one reads and parses its sprite file
    /// and sends back exactly one outcome. Tile types without a manifest entry are logged here,
    /// once, and drawn with a fallback colour for the rest of the session.
    pub(crate) fn load(assets_dir: &Path, manifest: &Manifest) -> Self {
        for tile in TileType::ALL {
            if !manifest.entries.contains_key(&ResourceKey::Tile(tile)) {
                warn!(key = %ResourceKey::Tile(tile), "no sprite registered");
            }
        }

        let (set, sender) = Self::pending(manifest.keys());
        for (key, file) in &manifest.entries {
            let path = assets_dir.join(file);
            let sender = sender.clone();
            let key = *key;
            debug!(%key, path = %path.display(), "loading sprite");
            let _ = thread::spawn(move || {
                let _ = sender.send((key, load_sprite(&path)));
            });
        }

        set
    }

    /// Creates a set with every key pending, together with the sender loaders report through.
    pub(crate) fn pending<I>(keys: I) -> (Self, Sender<LoadOutcome>)
    where
        I: IntoIterator<Item = ResourceKey>,
    {
        let (sender, outcomes) = channel();
        let set = Self {
            slots: keys
                .into_iter()
                .map(|key| (key, LoadState::Pending))
                .collect(),
            outcomes,
            resolved: 0,
            completion_reported: false,
        };

        (set, sender)
    }

    /// Applies every outcome received so far without blocking.
    ///
    /// Returns the load summary exactly once: on the first call after the last pending resource
    /// resolved. Every other call returns [`None`].
    ///
    /// Once every loader has hung up, resources still pending will never hear back. They are
    /// resolved as failures so that the summary is still reported.
    pub(crate) fn poll(&mut self) -> Option<LoadSummary> {
        loop {
            match self.outcomes.try_recv() {
                Ok((key, outcome)) => self.resolve(key, outcome),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.fail_pending();
                    break;
                }
            }
        }

        if self.completion_reported || !self.is_complete() {
            return None;
        }
        self.completion_reported = true;

        let failed = self
            .slots
            .values()
            .filter(|state| matches!(state, LoadState::Failed))
            .count();
        let summary = LoadSummary {
            loaded: self.total() - failed,
            failed,
        };
        info!(
            loaded = summary.loaded,
            failed = summary.failed,
            "all sprites resolved"
        );

        Some(summary)
    }

    /// Records the outcome of a single resource.
    ///
    /// Outcomes for unknown keys or for keys that already resolved are ignored, so that a slot is
    /// never counted twice.
    fn resolve(&mut self, key: ResourceKey, outcome: Result<Sprite>) {
        let Some(slot) = self.slots.get_mut(&key) else {
            warn!(%key, "ignoring outcome for unregistered sprite");
            return;
        };
        if *slot != LoadState::Pending {
            warn!(%key, "ignoring duplicate outcome for sprite");
            return;
        }

        *slot = match outcome {
            Ok(sprite) => {
                info!(%key, "sprite loaded");
                LoadState::Loaded(sprite)
            }
            Err(err) => {
                error!(%key, "failed to load sprite: {err:#}");
                LoadState::Failed
            }
        };
        self.resolved += 1;
    }

    /// Resolves every pending resource as a failure.
    ///
    /// This function is called once the outcome channel is disconnected, meaning no loader is
    /// left to report on those resources.
    fn fail_pending(&mut self) {
        for (key, slot) in &mut self.slots {
            if *slot == LoadState::Pending {
                error!(%key, "sprite loader exited without reporting");
                *slot = LoadState::Failed;
                self.resolved += 1;
            }
        }
    }

    /// Returns the number of registered resources.
    pub(crate) fn total(&self) -> usize {
        self.slots.len()
    }

    /// Returns the number of resources that are no longer pending.
    pub(crate) const fn resolved(&self) -> usize {
        self.resolved
    }

    /// Checks whether every registered resource has resolved.
    pub(crate) fn is_complete(&self) -> bool {
        self.resolved == self.total()
    }

    /// Looks a resource up for drawing.
    pub(crate) fn lookup(&self, key: ResourceKey) -> ResourceLookup<'_> {
        match self.slots.get(&key) {
            Some(LoadState::Loaded(sprite)) => ResourceLookup::Ready(sprite),
            Some(LoadState::Pending) => ResourceLookup::Pending,
            Some(LoadState::Failed) => ResourceLookup::Failed,
            None => ResourceLookup::Missing,
        }
    }
}

/// Reads and parses a sprite file.
fn load_sprite(path: &Path) -> Result<Sprite> {
    let contents = fs::read_to_string(path)
        .wrap_err_with(|| format!("failed to read sprite file {}", path.display()))?;

    contents
        .parse()
        .wrap_err_with(|| format!("invalid sprite file {}", path.display()))
}

#[cfg(test)]
mod tests {
    use std::{
        env, process,
        time::{Duration, Instant},
    };

    use super::*;

    /// Sprite used by the aggregation tests.
    const SPRITE: Sprite = Sprite {
        glyph: '#',
        fg: Color::White,
        bg: Color::Black,
    };

    /// Builds the keys of three tile types plus the character.
    fn all_keys() -> Vec<ResourceKey> {
        vec![
            ResourceKey::Tile(TileType::Ladder),
            ResourceKey::Tile(TileType::Walkable),
            ResourceKey::Tile(TileType::Unwalkable),
            ResourceKey::Character,
        ]
    }

    /// Polls a set until it reports completion or a generous deadline passes.
    fn poll_until_complete(set: &mut ResourceSet) -> Option<LoadSummary> {
        let deadline = Instant::now() + Duration::from_secs(10);
        while Instant::now() < deadline {
            if let Some(summary) = set.poll() {
                return Some(summary);
            }
            thread::sleep(Duration::from_millis(5));
        }

        None
    }

    #[test]
    fn test_resource_key_display() {
        assert_eq!(ResourceKey::Character.to_string(), "character");
        assert_eq!(
            ResourceKey::Tile(TileType::Ladder).to_string(),
            "tile Ladder (code 0)"
        );
        assert_eq!(
            ResourceKey::Tile(TileType::Unwalkable).to_string(),
            "tile Unwalkable (code 2)"
        );
    }

    #[test]
    fn test_sprite_parse_full_line() {
        let sprite: Sprite = "H yellow black".parse().expect("failed to parse sprite");

        assert_eq!(
            sprite,
            Sprite {
                glyph: 'H',
                fg: Color::Yellow,
                bg: Color::Black
            }
        );
    }

    #[test]
    fn test_sprite_parse_skips_comments_and_defaults_background() {
        assert!(
            "# wall\n\n  # still a comment\n# #ff0000\n"
                .parse::<Sprite>()
                .is_err(),
            "a file of comments holds no sprite"
        );

        let sprite: Sprite = "# floor\n. #336633".parse().expect("failed to parse sprite");
        assert_eq!(sprite.glyph, '.');
        assert_eq!(sprite.fg, Color::Rgb(0x33, 0x66, 0x33));
        assert_eq!(sprite.bg, Color::Reset);
    }

    #[test]
    fn test_sprite_parse_errors() {
        assert!("".parse::<Sprite>().is_err());
        assert!("HH yellow".parse::<Sprite>().is_err());
        assert!("H".parse::<Sprite>().is_err());
        assert!("H notacolour".parse::<Sprite>().is_err());
        assert!("H red blue green".parse::<Sprite>().is_err());
    }

    #[test]
    fn test_completion_fires_once_with_one_failure() {
        let (mut set, sender) = ResourceSet::pending(all_keys());

        sender
            .send((ResourceKey::Character, Ok(SPRITE)))
            .expect("failed to send outcome");
        sender
            .send((ResourceKey::Tile(TileType::Walkable), Ok(SPRITE)))
            .expect("failed to send outcome");
        assert_eq!(set.poll(), None);
        assert_eq!(set.resolved(), 2);

        sender
            .send((
                ResourceKey::Tile(TileType::Unwalkable),
                Err(eyre!("decode error")),
            ))
            .expect("failed to send outcome");
        assert_eq!(set.poll(), None);

        sender
            .send((ResourceKey::Tile(TileType::Ladder), Ok(SPRITE)))
            .expect("failed to send outcome");
        assert_eq!(
            set.poll(),
            Some(LoadSummary {
                loaded: 3,
                failed: 1
            })
        );
        assert_eq!(set.poll(), None);
        assert_eq!(set.poll(), None);
    }

    #[test]
    fn test_duplicate_outcomes_are_not_double_counted() {
        let (mut set, sender) = ResourceSet::pending(all_keys());

        for _ in 0..4 {
            sender
                .send((ResourceKey::Character, Ok(SPRITE)))
                .expect("failed to send outcome");
        }
        sender
            .send((ResourceKey::Tile(TileType::Ladder), Err(eyre!("late failure"))))
            .expect("failed to send outcome");

        assert_eq!(set.poll(), None);
        assert_eq!(set.resolved(), 2);
        assert!(!set.is_complete());
    }

    #[test]
    fn test_first_outcome_wins() {
        let (mut set, sender) = ResourceSet::pending([ResourceKey::Character]);

        sender
            .send((ResourceKey::Character, Err(eyre!("first"))))
            .expect("failed to send outcome");
        sender
            .send((ResourceKey::Character, Ok(SPRITE)))
            .expect("failed to send outcome");

        assert!(set.poll().is_some());
        assert_eq!(set.lookup(ResourceKey::Character), ResourceLookup::Failed);
    }

    #[test]
    fn test_silent_loaders_count_as_failed() {
        let (mut set, sender) = ResourceSet::pending(all_keys());
        sender
            .send((ResourceKey::Character, Ok(SPRITE)))
            .expect("failed to send outcome");
        assert_eq!(set.poll(), None);

        drop(sender);

        assert_eq!(
            set.poll(),
            Some(LoadSummary {
                loaded: 1,
                failed: 3
            })
        );
        assert_eq!(set.resolved(), 4);
        assert_eq!(
            set.lookup(ResourceKey::Tile(TileType::Ladder)),
            ResourceLookup::Failed
        );
        assert_eq!(set.poll(), None);
    }

    #[test]
    fn test_empty_set_completes_immediately() {
        let (mut set, _sender) = ResourceSet::pending(Vec::new());

        assert_eq!(
            set.poll(),
            Some(LoadSummary {
                loaded: 0,
                failed: 0
            })
        );
        assert_eq!(set.poll(), None);
    }

    #[test]
    fn test_lookup_states() {
        let (mut set, sender) = ResourceSet::pending([
            ResourceKey::Tile(TileType::Walkable),
            ResourceKey::Tile(TileType::Unwalkable),
            ResourceKey::Character,
        ]);
        sender
            .send((ResourceKey::Tile(TileType::Walkable), Ok(SPRITE)))
            .expect("failed to send outcome");
        sender
            .send((ResourceKey::Tile(TileType::Unwalkable), Err(eyre!("broken"))))
            .expect("failed to send outcome");
        let _ = set.poll();

        assert_eq!(
            set.lookup(ResourceKey::Tile(TileType::Walkable)),
            ResourceLookup::Ready(&SPRITE)
        );
        assert_eq!(
            set.lookup(ResourceKey::Tile(TileType::Unwalkable)),
            ResourceLookup::Failed
        );
        assert_eq!(set.lookup(ResourceKey::Character), ResourceLookup::Pending);
        assert_eq!(
            set.lookup(ResourceKey::Tile(TileType::Ladder)),
            ResourceLookup::Missing
        );
    }

    #[test]
    fn test_load_from_disk_with_missing_file() {
        let dir = env::temp_dir().join(format!("tilewalk-assets-{}", process::id()));
        fs::create_dir_all(&dir).expect("failed to create assets directory");
        fs::write(dir.join("ladder.sprite"), "H yellow").expect("failed to write sprite");
        fs::write(dir.join("floor.sprite"), ". green").expect("failed to write sprite");
        fs::write(dir.join("character.sprite"), "@ white red").expect("failed to write sprite");

        let mut set = ResourceSet::load(&dir, &Manifest::default());
        let summary = poll_until_complete(&mut set);
        let _ = fs::remove_dir_all(&dir);

        assert_eq!(
            summary,
            Some(LoadSummary {
                loaded: 3,
                failed: 1
            })
        );
        assert_eq!(
            set.lookup(ResourceKey::Tile(TileType::Unwalkable)),
            ResourceLookup::Failed
        );
        assert!(matches!(
            set.lookup(ResourceKey::Character),
            ResourceLookup::Ready(Sprite { glyph: '@', .. })
        ));
    }

    #[test]
    fn test_load_with_partial_manifest() {
        let dir = env::temp_dir().join(format!("tilewalk-partial-{}", process::id()));
        let manifest = Manifest::from_entries([(ResourceKey::Character, "character.sprite")]);

        let mut set = ResourceSet::load(&dir, &manifest);
        let summary = poll_until_complete(&mut set);

        assert_eq!(
            summary,
            Some(LoadSummary {
                loaded: 0,
                failed: 1
            })
        );
        assert_eq!(
            set.lookup(ResourceKey::Tile(TileType::Walkable)),
            ResourceLookup::Missing
        );
    }
}
