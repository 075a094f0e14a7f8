use hickory_proto::rr::RecordType as HickoryRecordType;
use zonequery_domain::RecordType;

/// Both sides agree on the IANA type code, so the mapping goes through it.
/// Types without a dedicated variant on either side survive as a bare code.
pub struct RecordTypeMapper;

impl RecordTypeMapper {
    pub fn to_hickory(record_type: &RecordType) -> HickoryRecordType {
        HickoryRecordType::from(record_type.to_u16())
    }

    pub fn from_hickory(hickory_type: HickoryRecordType) -> RecordType {
        RecordType::from_u16(u16::from(hickory_type))
    }

    /// Presentation mnemonic of a received record type (`TYPEn` if unnamed).
    pub fn mnemonic(hickory_type: HickoryRecordType) -> String {
        Self::from_hickory(hickory_type).to_string()
    }
}
