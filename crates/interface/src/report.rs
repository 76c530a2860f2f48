use std::{fmt, str::FromStr};

use serde::{ser::SerializeMap, Serialize, Serializer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BalanceMode {
    /// 온체인 + 채널 합계
    Total,
    Onchain,
    Channels,
    ChannelDetails,
    /// 잔액 대신 BTC 환율만 조회
    Rate,
}

impl BalanceMode {
    pub const ALL: [BalanceMode; 5] = [
        BalanceMode::Total,
        BalanceMode::Onchain,
        BalanceMode::Channels,
        BalanceMode::ChannelDetails,
        BalanceMode::Rate,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BalanceMode::Total => "total",
            BalanceMode::Onchain => "onchain",
            BalanceMode::Channels => "channels",
            BalanceMode::ChannelDetails => "channel-details",
            BalanceMode::Rate => "rate",
        }
    }

    /// "total, onchain, channels, channel-details, rate"
    pub fn valid_modes() -> String {
        Self::ALL
            .iter()
            .map(BalanceMode::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl Default for BalanceMode {
    fn default() -> Self {
        BalanceMode::Total
    }
}

impl fmt::Display for BalanceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BalanceMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.as_str() == s)
            .ok_or_else(|| s.to_string())
    }
}

/// 삽입 순서를 유지하는 문자열 맵. 같은 키를 다시 넣으면 값만 바뀐다.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BalanceRecord {
    entries: Vec<(String, String)>,
}

impl BalanceRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for BalanceRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RateReport {
    pub rates: BalanceRecord,
    /// ISO-8601
    pub timestamp: String,
    pub cached: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelDetail {
    pub peer_id: String,
    pub short_channel_id: String,
    pub outbound_capacity: String,
    pub inbound_capacity: String,
    pub outbound_balance: BalanceRecord,
    pub inbound_balance: BalanceRecord,
}

/// `nodebalance` 명령의 응답. 모드별로 최상위 키가 다르다.
#[derive(Debug, Clone, PartialEq)]
pub enum BalanceResponse {
    Total(BalanceRecord),
    Onchain(BalanceRecord),
    Channels(BalanceRecord),
    ChannelDetails(Vec<ChannelDetail>),
    Rates(RateReport),
}

impl Serialize for BalanceResponse {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            BalanceResponse::Total(record) => single_entry(serializer, "total_balance", record),
            BalanceResponse::Onchain(record) => single_entry(serializer, "onchain_balance", record),
            BalanceResponse::Channels(record) => single_entry(serializer, "channel_balance", record),
            BalanceResponse::ChannelDetails(channels) => {
                single_entry(serializer, "channels", channels)
            }
            // rate 모드는 감싸지 않고 그대로 내보낸다
            BalanceResponse::Rates(report) => report.serialize(serializer),
        }
    }
}

fn single_entry<S: Serializer, T: Serialize>(
    serializer: S,
    key: &str,
    value: &T,
) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(1))?;
    map.serialize_entry(key, value)?;
    map.end()
}
