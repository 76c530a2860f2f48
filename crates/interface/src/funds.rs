use serde::{Deserialize, Serialize};

/// `listfunds` 응답 중 잔액 계산에 쓰는 부분
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListFunds {
    #[serde(default)]
    pub outputs: Vec<FundOutput>,
    #[serde(default)]
    pub channels: Vec<FundChannel>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputStatus {
    Confirmed,
    Unconfirmed,
    Spent,
    Immature,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FundOutput {
    pub amount_msat: u64,
    pub status: OutputStatus,
    #[serde(default)]
    pub reserved: bool,
}

impl FundOutput {
    /// 확정되었고 예약되지 않은 출력만 잔액에 포함
    pub fn is_spendable(&self) -> bool {
        self.status == OutputStatus::Confirmed && !self.reserved
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChannelState {
    #[serde(rename = "CHANNELD_NORMAL")]
    Normal,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FundChannel {
    pub peer_id: String,
    #[serde(default)]
    pub connected: bool,
    pub state: ChannelState,
    #[serde(default)]
    pub short_channel_id: Option<String>,
    /// 채널 총 용량
    pub amount_msat: u64,
    /// 우리 쪽 잔액
    pub our_amount_msat: u64,
}

impl FundChannel {
    pub fn is_active(&self) -> bool {
        self.state == ChannelState::Normal && self.connected
    }
}

/// 표시용 채널 요약. 정상 상태이면서 연결된 채널에서만 만든다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelSnapshot {
    pub peer_id: String,
    pub short_channel_id: String,
    pub outbound_msat: u64,
    pub inbound_msat: u64,
}

const PEER_ID_PREFIX_LEN: usize = 10;

impl ChannelSnapshot {
    pub fn from_channel(channel: &FundChannel) -> Option<Self> {
        if !channel.is_active() {
            return None;
        }

        let prefix: String = channel.peer_id.chars().take(PEER_ID_PREFIX_LEN).collect();

        Some(Self {
            peer_id: format!("{prefix}..."),
            short_channel_id: channel
                .short_channel_id
                .clone()
                .unwrap_or_else(|| "N/A".to_string()),
            outbound_msat: channel.our_amount_msat,
            inbound_msat: channel.amount_msat.saturating_sub(channel.our_amount_msat),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_listfunds() {
        let raw = serde_json::json!({
            "outputs": [
                {"txid": "ab", "output": 0, "amount_msat": 100000000, "status": "confirmed", "reserved": false},
                {"txid": "cd", "output": 1, "amount_msat": 5000, "status": "unconfirmed", "reserved": false},
                {"txid": "ef", "output": 0, "amount_msat": 7000, "status": "confirmed", "reserved": true}
            ],
            "channels": [
                {
                    "peer_id": "02a1b2c3d4e5f60718293a4b5c6d7e8f",
                    "connected": true,
                    "state": "CHANNELD_NORMAL",
                    "short_channel_id": "103x1x0",
                    "amount_msat": 100000000,
                    "our_amount_msat": 60000000
                },
                {
                    "peer_id": "03ffff",
                    "connected": false,
                    "state": "CHANNELD_AWAITING_LOCKIN",
                    "amount_msat": 1000,
                    "our_amount_msat": 1000
                }
            ]
        });

        let funds: ListFunds = serde_json::from_value(raw).unwrap();
        assert_eq!(funds.outputs.len(), 3);
        assert!(funds.outputs[0].is_spendable());
        assert!(!funds.outputs[1].is_spendable());
        assert!(!funds.outputs[2].is_spendable());

        assert_eq!(funds.channels[0].state, ChannelState::Normal);
        assert_eq!(funds.channels[1].state, ChannelState::Other);
        assert!(funds.channels[0].is_active());
        assert!(!funds.channels[1].is_active());
    }

    #[test]
    fn test_channel_snapshot() {
        let channel = FundChannel {
            peer_id: "02a1b2c3d4e5f60718293a4b5c6d7e8f".to_string(),
            connected: true,
            state: ChannelState::Normal,
            short_channel_id: None,
            amount_msat: 100_000_000,
            our_amount_msat: 60_000_000,
        };

        let snapshot = ChannelSnapshot::from_channel(&channel).unwrap();
        assert_eq!(snapshot.peer_id, "02a1b2c3d4...");
        assert_eq!(snapshot.short_channel_id, "N/A");
        assert_eq!(snapshot.outbound_msat, 60_000_000);
        assert_eq!(snapshot.inbound_msat, 40_000_000);

        let offline = FundChannel {
            connected: false,
            ..channel
        };
        assert!(ChannelSnapshot::from_channel(&offline).is_none());
    }
}
