use std::time::Duration;

use google_api_proto::google::spanner::v1 as proto;
use proto::transaction_options::read_only::TimestampBound as SpannerTimestampBound;

/// How fresh the data observed by reads must be.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TimestampBound {
    /// Observe every transaction committed before the read started.
    Strong,
    /// Read data exactly this old.
    ExactStaleness(Duration),
    /// Read data at most this old, letting Cloud Spanner pick the timestamp.
    MaxStaleness(Duration),
}

impl Default for TimestampBound {
    fn default() -> Self {
        TimestampBound::Strong
    }
}

impl From<TimestampBound> for SpannerTimestampBound {
    fn from(value: TimestampBound) -> Self {
        match value {
            TimestampBound::Strong => SpannerTimestampBound::Strong(true),
            TimestampBound::ExactStaleness(duration) => {
                SpannerTimestampBound::ExactStaleness(duration.into())
            }
            TimestampBound::MaxStaleness(duration) => {
                SpannerTimestampBound::MaxStaleness(duration.into())
            }
        }
    }
}

/// The transaction a read runs in.
#[derive(Clone, Debug)]
pub(crate) enum TransactionSelector {
    SingleUseReadOnly(TimestampBound),
}

impl From<TransactionSelector> for proto::TransactionSelector {
    fn from(value: TransactionSelector) -> Self {
        match value {
            TransactionSelector::SingleUseReadOnly(bound) => proto::TransactionSelector {
                selector: Some(proto::transaction_selector::Selector::SingleUse(
                    proto::TransactionOptions {
                        mode: Some(proto::transaction_options::Mode::ReadOnly(
                            proto::transaction_options::ReadOnly {
                                timestamp_bound: Some(bound.into()),
                                ..Default::default()
                            },
                        )),
                        ..Default::default()
                    },
                )),
            },
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_strong_read_only() {
        let selector: proto::TransactionSelector =
            TransactionSelector::SingleUseReadOnly(TimestampBound::default()).into();
        match selector.selector {
            Some(proto::transaction_selector::Selector::SingleUse(options)) => {
                assert_eq!(
                    options.mode,
                    Some(proto::transaction_options::Mode::ReadOnly(
                        proto::transaction_options::ReadOnly {
                            timestamp_bound: Some(SpannerTimestampBound::Strong(true)),
                            ..Default::default()
                        }
                    ))
                );
            }
            other => panic!("unexpected selector {:?}", other),
        }
    }

    #[test]
    fn test_staleness() {
        let bound: SpannerTimestampBound =
            TimestampBound::MaxStaleness(Duration::from_secs(15)).into();
        assert_eq!(
            bound,
            SpannerTimestampBound::MaxStaleness(prost_types::Duration {
                seconds: 15,
                nanos: 0
            })
        );
    }
}
