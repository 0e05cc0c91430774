use chrono::{DateTime, FixedOffset, Offset, Utc};

/// All three gateways read local timestamps as China Standard Time (UTC+8)
const CHINA_OFFSET_SECS: i32 = 8 * 3600;

/// Gateway-facing timestamp rendering
/// All timestamps are taken as UTC and converted to gateway time on the way out
pub struct GatewayClock;

impl GatewayClock {
    /// Convert UTC timestamp to China Standard Time (UTC+8)
    pub fn utc_to_china(utc_time: DateTime<Utc>) -> DateTime<FixedOffset> {
        let offset = FixedOffset::east_opt(CHINA_OFFSET_SECS).unwrap_or_else(|| Utc.fix());
        utc_time.with_timezone(&offset)
    }

    /// Unix seconds as a string, the wallet client-side `timestamp` field
    pub fn unix_seconds(utc_time: DateTime<Utc>) -> String {
        utc_time.timestamp().to_string()
    }

    /// `yyyyMMddHHmmss` in gateway time, used by the bank-card gateway
    pub fn compact(utc_time: DateTime<Utc>) -> String {
        Self::utc_to_china(utc_time)
            .format("%Y%m%d%H%M%S")
            .to_string()
    }

    /// `yyyy-MM-dd HH:mm:ss` in gateway time, used by the mobile-wallet gateway
    pub fn readable(utc_time: DateTime<Utc>) -> String {
        Self::utc_to_china(utc_time)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string()
    }
}
