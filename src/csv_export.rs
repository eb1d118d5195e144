use std::{fs, path::Path};

use anyhow::Context;
use csv::{Terminator, WriterBuilder};
use encoding_rs::SHIFT_JIS;

use crate::HistoryRow;

/// Writes the rows as `\n`-terminated csv in Shift_JIS, creating the parent directory if needed.
pub fn write_history_csv(path: &Path, rows: &[HistoryRow]) -> anyhow::Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
    }
    let text = history_csv(rows)?;
    let bytes = encode_shift_jis(&text)?;
    fs::write(path, bytes).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

fn history_csv(rows: &[HistoryRow]) -> anyhow::Result<String> {
    let mut writer = WriterBuilder::new()
        .terminator(Terminator::Any(b'\n'))
        .from_writer(vec![]);
    for row in rows {
        writer.write_record(row.fields())?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("flush csv buffer: {}", e.error()))?;
    Ok(String::from_utf8(bytes)?)
}

pub fn encode_shift_jis(text: &str) -> anyhow::Result<Vec<u8>> {
    let (bytes, _, had_unmappable) = SHIFT_JIS.encode(text);
    if had_unmappable {
        anyhow::bail!("text contains characters that cannot be written as Shift_JIS");
    }
    Ok(bytes.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(values: [&str; 8]) -> HistoryRow {
        HistoryRow(values.map(str::to_string))
    }

    #[test]
    fn quotes_only_when_needed_and_ends_lines_with_newline() {
        let text = history_csv(&[
            row(["2024/03/01", "コンビニ", "本人", "1回払い", "", "03/27", "540", "540"]),
            row(["2024/03/02", "書店", "本人", "1回払い", "", "03/27", "1,200", "1,200"]),
        ])
        .unwrap();
        assert_eq!(
            text,
            "2024/03/01,コンビニ,本人,1回払い,,03/27,540,540\n\
             2024/03/02,書店,本人,1回払い,,03/27,\"1,200\",\"1,200\"\n"
        );
    }

    #[test]
    fn no_rows_gives_an_empty_file() {
        assert_eq!(history_csv(&[]).unwrap(), "");
    }

    #[test]
    fn encodes_japanese_text_as_shift_jis() {
        let bytes = encode_shift_jis("ご利用").unwrap();
        assert_eq!(&bytes[..2], &[0x82, 0xb2]);
        let (decoded, _, had_errors) = SHIFT_JIS.decode(&bytes);
        assert!(!had_errors);
        assert_eq!(decoded, "ご利用");
    }

    #[test]
    fn rejects_characters_outside_shift_jis() {
        assert!(encode_shift_jis("寿司 🍣").is_err());
    }

    #[test]
    fn creates_the_destination_directory() {
        let dir = std::env::temp_dir().join(format!("dcard-csv-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        let path = dir.join("nested").join("202403.csv");
        write_history_csv(&path, &[row(["a", "b", "c", "d", "e", "f", "g", "h"])]).unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"a,b,c,d,e,f,g,h\n");
    }
}
