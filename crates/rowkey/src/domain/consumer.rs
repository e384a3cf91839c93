use crate::{
    context::{PartitionKey, current_partition_key},
    domain::PartitionScoped,
    error::Result,
    generator::IdSource,
    id::RecordId,
    lifecycle::{Lifecycle, Persistable},
};

/// Contact, address and demographic details of a consumer. Every field is
/// optional.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConsumerProfile {
    pub consumer_code: Option<String>,
    pub full_name: Option<String>,
    pub id_number: Option<String>,
    pub mobile_phone: Option<String>,
    pub mobile_phone2: Option<String>,
    pub tel_no: Option<String>,
    pub email: Option<String>,
    /// `yyyyMMdd`.
    pub registration_date: Option<String>,
    pub intra_company_flag: Option<String>,
    pub bike_purchase_flag: Option<String>,
    pub geography_id: Option<i64>,
    pub address1: Option<String>,
    pub address2: Option<String>,
    pub post_code: Option<String>,
    pub contact_mechanism_type_id: Option<String>,
    pub sub_district: Option<String>,
    pub longitude: Option<String>,
    pub latitude: Option<String>,
    pub first_name: Option<String>,
    pub middle_name: Option<String>,
    pub last_name: Option<String>,
    /// `yyyyMMdd`.
    pub birthday: Option<String>,
    pub gender_type_id: Option<String>,
    pub marital_status_type_id: Option<String>,
    pub education: Option<String>,
    pub religion: Option<String>,
    pub occupation: Option<String>,
    pub npwp_no: Option<String>,
    pub npwp_name: Option<String>,
    pub delivery_address: Option<String>,
    pub expending_range: Option<String>,
    pub wish_to_receive_news: Option<String>,
    pub comment: Option<String>,
}

/// A dealer's consumer. Lives in the dealer's partition.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsumerInfo {
    pub consumer_id: RecordId,
    pub site_id: String,
    pub dealer_partition: PartitionKey,
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub profile: ConsumerProfile,
    #[cfg_attr(feature = "serde", serde(skip))]
    lifecycle: Lifecycle,
}

impl ConsumerInfo {
    /// A new, not yet persisted consumer with an empty profile.
    pub fn new(
        consumer_id: RecordId,
        site_id: impl Into<String>,
        dealer_partition: PartitionKey,
    ) -> Self {
        Self {
            consumer_id,
            site_id: site_id.into(),
            dealer_partition,
            profile: ConsumerProfile::default(),
            lifecycle: Lifecycle::new(),
        }
    }
}

impl Persistable for ConsumerInfo {
    fn id(&self) -> RecordId {
        self.consumer_id
    }

    fn is_new(&self) -> bool {
        self.lifecycle.is_new()
    }

    fn mark_persisted(&mut self) {
        self.lifecycle.mark_persisted();
    }
}

impl PartitionScoped for ConsumerInfo {
    fn partition_key(&self) -> &PartitionKey {
        &self.dealer_partition
    }
}

/// Plain data for a [`ConsumerInfo`], without lifecycle state.
///
/// With `serde`, the profile fields are flattened into the top-level object.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsumerInfoVo {
    pub consumer_id: RecordId,
    pub site_id: String,
    pub dealer_partition: PartitionKey,
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub profile: ConsumerProfile,
}

impl ConsumerInfoVo {
    /// Starts a builder around an id and partition the caller already holds.
    /// The site id starts empty and the profile blank.
    pub fn builder(consumer_id: RecordId, dealer_partition: PartitionKey) -> ConsumerInfoVoBuilder {
        ConsumerInfoVoBuilder {
            vo: Self {
                consumer_id,
                site_id: String::new(),
                dealer_partition,
                profile: ConsumerProfile::default(),
            },
        }
    }

    /// Starts a builder with a freshly allocated id in `dealer_partition`.
    ///
    /// # Errors
    ///
    /// Propagates the allocation failure.
    pub fn builder_with_id(
        ids: &dyn IdSource,
        dealer_partition: PartitionKey,
    ) -> Result<ConsumerInfoVoBuilder> {
        Ok(Self::builder(ids.allocate()?, dealer_partition))
    }

    /// Starts a builder with a freshly allocated id in the partition of the
    /// active session scope.
    ///
    /// The id is allocated first, then the partition is resolved. If either
    /// step fails no builder is produced; an id allocated before a missing
    /// scope is detected is simply never used.
    ///
    /// # Errors
    ///
    /// - [`Error::NoContext`] outside every partition scope.
    /// - Any allocation failure.
    ///
    /// [`Error::NoContext`]: crate::Error::NoContext
    pub fn builder_with_default(ids: &dyn IdSource) -> Result<ConsumerInfoVoBuilder> {
        let consumer_id = ids.allocate()?;
        let dealer_partition = current_partition_key()?;
        Ok(Self::builder(consumer_id, dealer_partition))
    }
}

impl PartitionScoped for ConsumerInfoVo {
    fn partition_key(&self) -> &PartitionKey {
        &self.dealer_partition
    }
}

/// Fills in a [`ConsumerInfoVo`] whose id and partition are already fixed.
///
/// Profile setters write into [`ConsumerProfile`]; [`Self::profile`] replaces
/// it wholesale, discarding anything set before.
#[derive(Debug, Clone)]
pub struct ConsumerInfoVoBuilder {
    vo: ConsumerInfoVo,
}

impl ConsumerInfoVoBuilder {
    /// Site that owns the consumer.
    #[must_use]
    pub fn site_id(mut self, site_id: impl Into<String>) -> Self {
        self.vo.site_id = site_id.into();
        self
    }

    /// Geography of the consumer's address, stored in the profile.
    #[must_use]
    pub fn geography_id(mut self, geography_id: i64) -> Self {
        self.vo.profile.geography_id = Some(geography_id);
        self
    }

    /// Replaces the whole profile.
    #[must_use]
    pub fn profile(mut self, profile: ConsumerProfile) -> Self {
        self.vo.profile = profile;
        self
    }

    optional_setters!(profile:
        consumer_code,
        full_name,
        id_number,
        mobile_phone,
        mobile_phone2,
        tel_no,
        email,
        registration_date,
        intra_company_flag,
        bike_purchase_flag,
        address1,
        address2,
        post_code,
        contact_mechanism_type_id,
        sub_district,
        longitude,
        latitude,
        first_name,
        middle_name,
        last_name,
        birthday,
        gender_type_id,
        marital_status_type_id,
        education,
        religion,
        occupation,
        npwp_no,
        npwp_name,
        delivery_address,
        expending_range,
        wish_to_receive_news,
        comment,
    );

    #[must_use]
    pub fn build(self) -> ConsumerInfoVo {
        self.vo
    }
}

impl From<ConsumerInfoVo> for ConsumerInfo {
    fn from(vo: ConsumerInfoVo) -> Self {
        Self {
            consumer_id: vo.consumer_id,
            site_id: vo.site_id,
            dealer_partition: vo.dealer_partition,
            profile: vo.profile,
            lifecycle: Lifecycle::new(),
        }
    }
}

impl From<ConsumerInfo> for ConsumerInfoVo {
    fn from(entity: ConsumerInfo) -> Self {
        Self {
            consumer_id: entity.consumer_id,
            site_id: entity.site_id,
            dealer_partition: entity.dealer_partition,
            profile: entity.profile,
        }
    }
}
