//! Closed set of system (DDM) columns carried by every history table.
//!
//! Classification depends on this set being complete: any column whose name
//! is not listed here is treated as operational business data.

/// System/audit metadata column present on every operational history table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DdmColumn {
    /// `ddm_created_at`
    CreatedAt,
    /// `ddm_created_by`
    CreatedBy,
    /// `ddm_dml_op`
    DmlOp,
    /// `ddm_system_id`
    SystemId,
    /// `ddm_application_id`
    ApplicationId,
    /// `ddm_business_process_id`
    BusinessProcessId,
    /// `ddm_business_process_definition_id`
    BusinessProcessDefinitionId,
    /// `ddm_business_process_instance_id`
    BusinessProcessInstanceId,
    /// `ddm_business_activity`
    BusinessActivity,
    /// `ddm_business_activity_instance_id`
    BusinessActivityInstanceId,
    /// `ddm_digital_sign`
    DigitalSign,
    /// `ddm_digital_sign_derived`
    DigitalSignDerived,
    /// `ddm_digital_sign_checksum`
    DigitalSignChecksum,
    /// `ddm_digital_sign_derived_checksum`
    DigitalSignDerivedChecksum,
}

impl DdmColumn {
    /// Every DDM column, in the order they are documented.
    pub const ALL: [Self; 14] = [
        Self::CreatedAt,
        Self::CreatedBy,
        Self::DmlOp,
        Self::SystemId,
        Self::ApplicationId,
        Self::BusinessProcessId,
        Self::BusinessProcessDefinitionId,
        Self::BusinessProcessInstanceId,
        Self::BusinessActivity,
        Self::BusinessActivityInstanceId,
        Self::DigitalSign,
        Self::DigitalSignDerived,
        Self::DigitalSignChecksum,
        Self::DigitalSignDerivedChecksum,
    ];

    /// Database column name.
    ///
    /// # Examples
    ///
    /// ```
    /// use history_excerptor::domain::history::DdmColumn;
    ///
    /// assert_eq!(DdmColumn::CreatedAt.column_name(), "ddm_created_at");
    /// ```
    pub const fn column_name(self) -> &'static str {
        match self {
            Self::CreatedAt => "ddm_created_at",
            Self::CreatedBy => "ddm_created_by",
            Self::DmlOp => "ddm_dml_op",
            Self::SystemId => "ddm_system_id",
            Self::ApplicationId => "ddm_application_id",
            Self::BusinessProcessId => "ddm_business_process_id",
            Self::BusinessProcessDefinitionId => "ddm_business_process_definition_id",
            Self::BusinessProcessInstanceId => "ddm_business_process_instance_id",
            Self::BusinessActivity => "ddm_business_activity",
            Self::BusinessActivityInstanceId => "ddm_business_activity_instance_id",
            Self::DigitalSign => "ddm_digital_sign",
            Self::DigitalSignDerived => "ddm_digital_sign_derived",
            Self::DigitalSignChecksum => "ddm_digital_sign_checksum",
            Self::DigitalSignDerivedChecksum => "ddm_digital_sign_derived_checksum",
        }
    }

    /// Look up the DDM column for a result-set column name.
    ///
    /// Returns `None` for operational columns.
    pub fn from_column_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|column| column.column_name() == name)
    }
}
