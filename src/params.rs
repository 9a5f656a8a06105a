//! Scanner configuration aggregate.

use serde::{Deserialize, Serialize};

use crate::align::AlignParams;
use crate::locate::LocateParams;
use crate::sample::SampleParams;

/// Full configuration for a [`Scanner`](crate::Scanner). Every field has a
/// working default, so a partial JSON document is enough to tune one stage.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanParams {
    pub locate: LocateParams,
    pub sample: SampleParams,
    pub align: AlignParams,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let params: ScanParams = serde_json::from_str(r#"{"align": {"min_centers": 5}}"#).unwrap();
        assert_eq!(params.align.min_centers, 5);
        assert_eq!(params.locate.block_size, LocateParams::default().block_size);
        assert_eq!(
            params.sample.wiggle_offsets.len(),
            SampleParams::default().wiggle_offsets.len()
        );
    }
}
