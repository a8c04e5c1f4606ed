use crate::extraction::StrategyError;

/// Decodes `bytes` as UTF-8, discarding invalid sequences rather than replacing them.
pub fn decode(bytes: &[u8]) -> String {
    bytes.utf8_chunks().map(|chunk| chunk.valid()).collect()
}

/// Strategy form of [`decode`]; never fails.
pub(crate) fn extract(bytes: &[u8]) -> Result<String, StrategyError> {
    Ok(decode(bytes))
}
