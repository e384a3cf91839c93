use crate::{
    error::Result,
    generator::IdSource,
    id::RecordId,
    lifecycle::{Lifecycle, Persistable},
};

/// A vehicle color, shared by every dealer.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorInfo {
    pub color_id: RecordId,
    pub site_id: Option<String>,
    pub color_code: Option<String>,
    pub description: Option<String>,
    #[cfg_attr(feature = "serde", serde(skip))]
    lifecycle: Lifecycle,
}

impl ColorInfo {
    /// A new, not yet persisted color.
    pub fn new(color_id: RecordId) -> Self {
        Self {
            color_id,
            site_id: None,
            color_code: None,
            description: None,
            lifecycle: Lifecycle::new(),
        }
    }
}

impl Persistable for ColorInfo {
    fn id(&self) -> RecordId {
        self.color_id
    }

    fn is_new(&self) -> bool {
        self.lifecycle.is_new()
    }

    fn mark_persisted(&mut self) {
        self.lifecycle.mark_persisted();
    }
}

/// Plain data for a [`ColorInfo`], without lifecycle state.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorInfoVo {
    pub color_id: RecordId,
    pub site_id: Option<String>,
    pub color_code: Option<String>,
    pub description: Option<String>,
}

impl ColorInfoVo {
    /// Starts a builder around an id the caller already holds.
    pub fn builder(color_id: RecordId) -> ColorInfoVoBuilder {
        ColorInfoVoBuilder {
            vo: Self {
                color_id,
                site_id: None,
                color_code: None,
                description: None,
            },
        }
    }

    /// Starts a builder with a freshly allocated id.
    ///
    /// # Errors
    ///
    /// Propagates the allocation failure; no builder is produced.
    pub fn builder_with_id(ids: &dyn IdSource) -> Result<ColorInfoVoBuilder> {
        Ok(Self::builder(ids.allocate()?))
    }
}

/// Fills in a [`ColorInfoVo`] whose id is already fixed.
#[derive(Debug, Clone)]
pub struct ColorInfoVoBuilder {
    vo: ColorInfoVo,
}

impl ColorInfoVoBuilder {
    optional_setters!(site_id, color_code, description);

    #[must_use]
    pub fn build(self) -> ColorInfoVo {
        self.vo
    }
}

impl From<ColorInfoVo> for ColorInfo {
    fn from(vo: ColorInfoVo) -> Self {
        Self {
            color_id: vo.color_id,
            site_id: vo.site_id,
            color_code: vo.color_code,
            description: vo.description,
            lifecycle: Lifecycle::new(),
        }
    }
}

impl From<ColorInfo> for ColorInfoVo {
    fn from(entity: ColorInfo) -> Self {
        Self {
            color_id: entity.color_id,
            site_id: entity.site_id,
            color_code: entity.color_code,
            description: entity.description,
        }
    }
}
