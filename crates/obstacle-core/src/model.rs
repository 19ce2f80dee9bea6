//! Obstacle data model
//!
//! [`Obstacle`] is the in-memory entity. [`StoredObstacle`] is its on-disk
//! record: the persisted blob is a JSON array of these, with `imageUri`
//! encoded as an empty string when no image was attached.
//!
//! ## Persisted record
//!
//! ```json
//! {
//!   "id": "1718035200000",
//!   "title": "Pole",
//!   "description": "Low overhead cable",
//!   "latitude": 48.85,
//!   "longitude": 2.35,
//!   "imageUri": ""
//! }
//! ```
//!
//! Field names are part of the storage contract. Renaming or removing one
//! needs a migration for blobs already on devices.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Opaque obstacle identifier
///
/// Generated by the registry at creation time and never changed afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObstacleId(String);

impl ObstacleId {
    /// Wrap an existing identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier as text
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObstacleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ObstacleId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Geographic position in decimal degrees
///
/// # Sentinel
///
/// [`Coordinates::UNKNOWN`] (`0, 0`) is stored when no position could be
/// acquired. It is indistinguishable on disk from a real fix at that point;
/// callers should treat [`Coordinates::is_unknown`] as "no location".
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    /// Latitude, -90..=90
    pub latitude: f64,
    /// Longitude, -180..=180
    pub longitude: f64,
}

impl Coordinates {
    /// Placeholder stored when location was unavailable
    pub const UNKNOWN: Self = Self {
        latitude: 0.0,
        longitude: 0.0,
    };

    /// Create a new position
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Whether this is the "no location" sentinel
    pub fn is_unknown(&self) -> bool {
        self.latitude == 0.0 && self.longitude == 0.0
    }

    /// Whether both components are finite and within range
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

impl Default for Coordinates {
    fn default() -> Self {
        Self::UNKNOWN
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_unknown() {
            f.write_str("unknown")
        } else {
            write!(f, "{}, {}", self.latitude, self.longitude)
        }
    }
}

/// Local reference to an attached image
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageRef(PathBuf);

impl ImageRef {
    /// Wrap a local image path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    /// The referenced path
    pub fn path(&self) -> &Path {
        &self.0
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

/// Where the user wants the obstacle photo to come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageChoice {
    /// No photo
    #[default]
    None,
    /// Pick an existing photo from the library
    Library,
    /// Take a new photo with the camera
    Camera,
}

/// A recorded route obstruction
///
/// Obstacles are immutable once created. Only the registry constructs them.
#[derive(Debug, Clone, PartialEq)]
pub struct Obstacle {
    id: ObstacleId,
    title: String,
    description: String,
    position: Coordinates,
    image: Option<ImageRef>,
}

impl Obstacle {
    pub(crate) fn new(
        id: ObstacleId,
        title: String,
        description: String,
        position: Coordinates,
        image: Option<ImageRef>,
    ) -> Self {
        Self {
            id,
            title,
            description,
            position,
            image,
        }
    }

    /// Unique identifier
    pub fn id(&self) -> &ObstacleId {
        &self.id
    }

    /// Short title
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Free-form description
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Position at creation time; may be [`Coordinates::UNKNOWN`]
    pub fn position(&self) -> Coordinates {
        self.position
    }

    /// Attached photo, if any
    pub fn image(&self) -> Option<&ImageRef> {
        self.image.as_ref()
    }

    pub(crate) fn with_id(mut self, id: ObstacleId) -> Self {
        self.id = id;
        self
    }
}

/// Persisted form of an [`Obstacle`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredObstacle {
    /// Identifier as text
    pub id: String,
    /// Title
    pub title: String,
    /// Description
    pub description: String,
    /// Latitude, `0` when unknown
    pub latitude: f64,
    /// Longitude, `0` when unknown
    pub longitude: f64,
    /// Image path, empty when there is no image
    #[serde(default)]
    pub image_uri: String,
}

impl From<&Obstacle> for StoredObstacle {
    fn from(obstacle: &Obstacle) -> Self {
        Self {
            id: obstacle.id.as_str().to_string(),
            title: obstacle.title.clone(),
            description: obstacle.description.clone(),
            latitude: obstacle.position.latitude,
            longitude: obstacle.position.longitude,
            image_uri: obstacle
                .image
                .as_ref()
                .map(|image| image.path().to_string_lossy().into_owned())
                .unwrap_or_default(),
        }
    }
}

impl From<StoredObstacle> for Obstacle {
    fn from(stored: StoredObstacle) -> Self {
        let image = if stored.image_uri.is_empty() {
            None
        } else {
            Some(ImageRef::new(stored.image_uri))
        };

        Self {
            id: ObstacleId(stored.id),
            title: stored.title,
            description: stored.description,
            position: Coordinates::new(stored.latitude, stored.longitude),
            image,
        }
    }
}
