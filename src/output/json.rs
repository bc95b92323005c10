//! JSON output built on the serializable value keys.

use crate::models::{Address, AddressKey, RangeKey, SequentialRange};
use crate::processing::{GapRow, OverlapConflict};
use serde::Serialize;

/// One range with its key.
#[derive(Debug, Clone, Serialize)]
pub struct RangeRecord {
    pub range: String,
    /// Exact address count, as text since it can exceed 64 bits.
    pub count: String,
    pub key: RangeKey,
}

impl From<&SequentialRange> for RangeRecord {
    fn from(range: &SequentialRange) -> Self {
        RangeRecord {
            range: range.to_string(),
            count: range.count().to_string(),
            key: range.to_key(),
        }
    }
}

/// One prefix or sequential block with its key.
#[derive(Debug, Clone, Serialize)]
pub struct BlockRecord {
    pub block: String,
    pub count: String,
    pub key: AddressKey,
}

impl From<&Address> for BlockRecord {
    fn from(block: &Address) -> Self {
        BlockRecord {
            block: block.to_string(),
            count: block.count().to_string(),
            key: block.to_key(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GapRecord {
    pub gap: RangeRecord,
    pub blocks: Vec<BlockRecord>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OverlapRecord {
    pub first_index: usize,
    pub second_index: usize,
    pub overlap: RangeRecord,
}

pub fn ranges_to_json(ranges: &[SequentialRange]) -> serde_json::Result<String> {
    let records: Vec<RangeRecord> = ranges.iter().map(RangeRecord::from).collect();
    serde_json::to_string_pretty(&records)
}

pub fn blocks_to_json(blocks: &[Address]) -> serde_json::Result<String> {
    let records: Vec<BlockRecord> = blocks.iter().map(BlockRecord::from).collect();
    serde_json::to_string_pretty(&records)
}

pub fn gaps_to_json(rows: &[GapRow]) -> serde_json::Result<String> {
    let records: Vec<GapRecord> = rows
        .iter()
        .map(|row| GapRecord {
            gap: RangeRecord::from(&row.range),
            blocks: row.blocks.iter().map(BlockRecord::from).collect(),
        })
        .collect();
    serde_json::to_string_pretty(&records)
}

pub fn overlaps_to_json(conflicts: &[OverlapConflict]) -> serde_json::Result<String> {
    let records: Vec<OverlapRecord> = conflicts
        .iter()
        .map(|c| OverlapRecord {
            first_index: c.first_index,
            second_index: c.second_index,
            overlap: RangeRecord::from(&c.overlap),
        })
        .collect();
    serde_json::to_string_pretty(&records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::IpVersion;
    use crate::processing::find_gaps;
    use pretty_assertions::assert_eq;
    use serde_json::Value;

    fn v4(lo: u128, hi: u128) -> SequentialRange {
        SequentialRange::from_value_range(IpVersion::V4, lo, hi).unwrap()
    }

    #[test]
    fn test_ranges_to_json_keys_rebuild() {
        let ranges = vec![v4(0x0A000000, 0x0A0000FF)];
        let json: Value = serde_json::from_str(&ranges_to_json(&ranges).unwrap()).unwrap();
        assert_eq!(json[0]["range"], "10.0.0.0 -> 10.0.0.255");
        assert_eq!(json[0]["count"], "256");

        let key: RangeKey = serde_json::from_value(json[0]["key"].clone()).unwrap();
        assert_eq!(SequentialRange::from_key(&key).unwrap(), ranges[0]);
    }

    #[test]
    fn test_gaps_to_json() {
        let container = v4(0, 255);
        let rows = find_gaps(&container, &[v4(0, 127)]);
        let json: Value = serde_json::from_str(&gaps_to_json(&rows).unwrap()).unwrap();
        assert_eq!(json.as_array().unwrap().len(), 1);
        assert_eq!(json[0]["blocks"][0]["block"], "0.0.0.128/25");
        assert_eq!(json[0]["blocks"][0]["key"]["prefix_len"], 25);
        assert_eq!(json[0]["gap"]["count"], "128");
    }
}
