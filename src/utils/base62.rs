//! Base62 短码编解码
//!
//! 数值 id 与短码之间的双射：字母表固定为 `0-9a-zA-Z`，高位在前。
//! 只接受规范形式，`"0"` 以外以 `'0'` 开头的串视为非法，
//! 因此每个 `u64` 恰好对应一个短码。

use crate::errors::{Result, ScantyError};

const ALPHABET: &[u8; 62] = b"0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";
const BASE: u64 = 62;

/// `u64::MAX` 编码后的长度
pub const MAX_CODE_LEN: usize = 11;

#[inline]
fn digit_value(c: u8) -> Option<u64> {
    match c {
        b'0'..=b'9' => Some((c - b'0') as u64),
        b'a'..=b'z' => Some((c - b'a') as u64 + 10),
        b'A'..=b'Z' => Some((c - b'A') as u64 + 36),
        _ => None,
    }
}

/// 将 id 编码为短码
pub fn encode(mut id: u64) -> String {
    if id == 0 {
        return "0".to_string();
    }

    let mut buf = [0u8; MAX_CODE_LEN];
    let mut pos = MAX_CODE_LEN;
    while id > 0 {
        pos -= 1;
        buf[pos] = ALPHABET[(id % BASE) as usize];
        id /= BASE;
    }

    // buf 中只有 ASCII 字母数字
    buf[pos..].iter().map(|&b| b as char).collect()
}

/// 将短码解码为 id
pub fn decode(code: &str) -> Result<u64> {
    let bytes = code.as_bytes();
    if bytes.is_empty() {
        return Err(ScantyError::invalid_code("短码为空"));
    }
    if bytes.len() > 1 && bytes[0] == b'0' {
        return Err(ScantyError::invalid_code(format!(
            "短码不是规范形式（前导 0）: {}",
            code
        )));
    }

    let mut id: u64 = 0;
    for (pos, &c) in bytes.iter().enumerate() {
        let digit = digit_value(c).ok_or_else(|| {
            ScantyError::invalid_code(format!(
                "短码包含非法字符 {:?}（位置 {}）: {}",
                c as char, pos, code
            ))
        })?;
        id = id
            .checked_mul(BASE)
            .and_then(|v| v.checked_add(digit))
            .ok_or_else(|| ScantyError::invalid_code(format!("短码超出 64 位范围: {}", code)))?;
    }

    Ok(id)
}
