use std::collections::HashMap;
use std::fmt;

use crate::error::CredentialError;

/// 配置里切出来的单个账号 Cookie，原始字节，尚未校验编码。
#[derive(Clone, PartialEq, Eq)]
pub struct RawAccount(Vec<u8>);

impl RawAccount {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl From<Vec<u8>> for RawAccount {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl From<&[u8]> for RawAccount {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}

impl From<&str> for RawAccount {
    fn from(s: &str) -> Self {
        Self(s.as_bytes().to_vec())
    }
}

// 不打印内容，避免 Cookie 进日志
impl fmt::Debug for RawAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RawAccount({} bytes)", self.0.len())
    }
}

/// 一个账号的 Cookie 键值对，`kps=..;sign=..;vcode=..;user=..`。
///
/// 解析是宽松的：没有 `=` 的片段和空片段直接丢弃，重复的键后者覆盖前者。
/// 是否包含 `kps`/`sign`/`vcode` 不在这里校验，缺失时接口调用自然会失败。
#[derive(Clone, Default, PartialEq, Eq)]
pub struct CredentialSet {
    fields: HashMap<String, String>,
}

impl CredentialSet {
    pub fn parse(raw: &str) -> Self {
        let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
        let mut fields = HashMap::new();
        for fragment in compact.split(';') {
            if fragment.is_empty() {
                continue;
            }
            if let Some((key, value)) = fragment.split_once('=') {
                fields.insert(key.to_string(), value.to_string());
            }
        }
        Self { fields }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    pub fn kps(&self) -> Option<&str> {
        self.get("kps")
    }

    pub fn sign(&self) -> Option<&str> {
        self.get("sign")
    }

    pub fn vcode(&self) -> Option<&str> {
        self.get("vcode")
    }

    /// 展示用的账号名，可选。
    pub fn user(&self) -> Option<&str> {
        self.get("user")
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl TryFrom<&RawAccount> for CredentialSet {
    type Error = CredentialError;

    fn try_from(raw: &RawAccount) -> Result<Self, Self::Error> {
        let text = std::str::from_utf8(raw.as_bytes()).map_err(|e| CredentialError::NotUtf8 {
            valid_up_to: e.valid_up_to(),
        })?;
        Ok(Self::parse(text))
    }
}

impl fmt::Debug for CredentialSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<&str> = self.fields.keys().map(String::as_str).collect();
        keys.sort_unstable();
        f.debug_struct("CredentialSet").field("keys", &keys).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic() {
        let set = CredentialSet::parse("kps=A;sign=B;vcode=C");
        assert_eq!(set.len(), 3);
        assert_eq!(set.kps(), Some("A"));
        assert_eq!(set.sign(), Some("B"));
        assert_eq!(set.vcode(), Some("C"));
        assert_eq!(set.user(), None);
    }

    #[test]
    fn test_parse_drops_malformed_fragments() {
        let set = CredentialSet::parse("kps=A;;garbage;sign=B");
        assert_eq!(set.len(), 2);
        assert_eq!(set.kps(), Some("A"));
        assert_eq!(set.sign(), Some("B"));
    }

    #[test]
    fn test_parse_empty() {
        assert!(CredentialSet::parse("").is_empty());
        assert!(CredentialSet::parse(" ; ;").is_empty());
    }

    #[test]
    fn test_parse_strips_whitespace_and_splits_on_first_eq() {
        let set = CredentialSet::parse(" kps = A==; sign=x=y ;\tuser=张三\n");
        assert_eq!(set.kps(), Some("A=="));
        assert_eq!(set.sign(), Some("x=y"));
        assert_eq!(set.user(), Some("张三"));
    }

    #[test]
    fn test_later_duplicate_wins() {
        let set = CredentialSet::parse("kps=old;kps=new");
        assert_eq!(set.kps(), Some("new"));
    }

    #[test]
    fn test_try_from_raw() {
        let raw = RawAccount::from("kps=A;sign=B");
        let set = CredentialSet::try_from(&raw).unwrap();
        assert_eq!(set.sign(), Some("B"));

        let bad = RawAccount::from(vec![b'k', b'=', 0xff, 0xfe]);
        let err = CredentialSet::try_from(&bad).unwrap_err();
        assert!(matches!(err, CredentialError::NotUtf8 { valid_up_to: 2 }));
    }

    #[test]
    fn test_debug_hides_values() {
        let set = CredentialSet::parse("kps=secret;sign=hidden");
        let dbg = format!("{:?}", set);
        assert!(!dbg.contains("secret"));
        assert!(dbg.contains("kps"));
        assert!(!format!("{:?}", RawAccount::from("kps=secret")).contains("secret"));
    }
}
