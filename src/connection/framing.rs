//! NETCONF 1.0 end-of-message framing (RFC 6242 section 4.3).
//!
//! Junos keeps speaking base:1.0 framing unless both sides advertise
//! base:1.1, and the client hello only advertises 1.0.

use bytes::{Buf, BufMut, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use super::ConnectionError;

/// NETCONF 1.0 message delimiter
pub const EOM_DELIMITER: &str = "]]>]]>";

/// Splits a byte stream on `]]>]]>` and appends it on the way out.
#[derive(Debug, Default)]
pub struct EomCodec {
    /// Bytes of the buffer already scanned without finding a delimiter
    next_index: usize,
}

impl EomCodec {
    /// Create a new codec
    pub fn new() -> Self {
        Self::default()
    }
}

impl Decoder for EomCodec {
    type Item = String;
    type Error = ConnectionError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<String>, ConnectionError> {
        let delimiter = EOM_DELIMITER.as_bytes();
        // The delimiter may straddle the previous scan boundary.
        let start = self.next_index.saturating_sub(delimiter.len() - 1);

        let found = src[start..]
            .windows(delimiter.len())
            .position(|window| window == delimiter)
            .map(|offset| start + offset);

        match found {
            Some(index) => {
                let frame = src.split_to(index);
                src.advance(delimiter.len());
                self.next_index = 0;
                String::from_utf8(frame.to_vec())
                    .map(Some)
                    .map_err(|e| ConnectionError::Framing(format!("invalid UTF-8 in frame: {}", e)))
            }
            None => {
                self.next_index = src.len();
                Ok(None)
            }
        }
    }
}

impl<'a> Encoder<&'a str> for EomCodec {
    type Error = ConnectionError;

    fn encode(&mut self, item: &'a str, dst: &mut BytesMut) -> Result<(), ConnectionError> {
        dst.reserve(item.len() + EOM_DELIMITER.len() + 1);
        dst.put_slice(item.as_bytes());
        dst.put_slice(EOM_DELIMITER.as_bytes());
        dst.put_u8(b'\n');
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_single_frame() {
        let mut codec = EomCodec::new();
        let mut buf = BytesMut::from("<rpc-reply><ok/></rpc-reply>]]>]]>");
        let frame = codec.decode(&mut buf).unwrap();
        assert_eq!(frame.as_deref(), Some("<rpc-reply><ok/></rpc-reply>"));
        assert!(buf.is_empty());
    }

    #[test]
    fn test_decode_delimiter_split_across_reads() {
        let mut codec = EomCodec::new();
        let mut buf = BytesMut::from("<hello/>]]>");
        assert!(codec.decode(&mut buf).unwrap().is_none());

        buf.extend_from_slice(b"]]>\n<rpc-reply/>");
        let frame = codec.decode(&mut buf).unwrap();
        assert_eq!(frame.as_deref(), Some("<hello/>"));

        // Remainder stays buffered until its own delimiter arrives
        assert!(codec.decode(&mut buf).unwrap().is_none());
        buf.extend_from_slice(b"]]>]]>");
        let frame = codec.decode(&mut buf).unwrap();
        assert_eq!(frame.as_deref(), Some("\n<rpc-reply/>"));
    }

    #[test]
    fn test_decode_two_frames_in_one_read() {
        let mut codec = EomCodec::new();
        let mut buf = BytesMut::from("a]]>]]>b]]>]]>");
        assert_eq!(codec.decode(&mut buf).unwrap().as_deref(), Some("a"));
        assert_eq!(codec.decode(&mut buf).unwrap().as_deref(), Some("b"));
        assert!(codec.decode(&mut buf).unwrap().is_none());
    }

    #[test]
    fn test_decode_rejects_invalid_utf8() {
        let mut codec = EomCodec::new();
        let mut buf = BytesMut::new();
        buf.extend_from_slice(&[0xff, 0xfe]);
        buf.extend_from_slice(EOM_DELIMITER.as_bytes());
        assert!(matches!(
            codec.decode(&mut buf),
            Err(ConnectionError::Framing(_))
        ));
    }

    #[test]
    fn test_encode_appends_delimiter() {
        let mut codec = EomCodec::new();
        let mut buf = BytesMut::new();
        codec.encode("<rpc/>", &mut buf).unwrap();
        assert_eq!(&buf[..], b"<rpc/>]]>]]>\n");
    }
}
