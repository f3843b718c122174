use assert_cmd::prelude::*;
use retrocompressor::STDRESULT;
use std::path::Path;
use std::process::Command;

fn write_fixture(dir: &Path, name: &str, data: &[u8]) -> std::path::PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, data).expect("write fixture");
    path
}

fn sample_text() -> Vec<u8> {
    let pattern = b"the quick brown fox jumps over the lazy dog, again and again. ";
    let mut data = Vec::new();
    for _ in 0..40 {
        data.extend_from_slice(pattern);
    }
    data
}

fn write_tga(path: &Path, width: u16, height: u16, pixels: &[(u8, u8, u8)]) {
    let mut data = vec![0u8; 18];
    data[12..14].copy_from_slice(&width.to_le_bytes());
    data[14..16].copy_from_slice(&height.to_le_bytes());
    data[16] = 24;
    for &(r, g, b) in pixels {
        data.push(b);
        data.push(g);
        data.push(r);
    }
    std::fs::write(path, data).expect("write fixture tga");
}

#[test]
fn ac_demo_succeeds_on_a_text_file() -> STDRESULT {
    let dir = tempfile::tempdir()?;
    let input = write_fixture(dir.path(), "sample.txt", &sample_text());

    let mut cmd = Command::cargo_bin("retrocompressor")?;
    cmd.arg("ac-demo").arg("-i").arg(&input).assert().success();
    Ok(())
}

#[test]
fn lzw_code_then_decode_round_trips() -> STDRESULT {
    let dir = tempfile::tempdir()?;
    let input = write_fixture(dir.path(), "sample.txt", &sample_text());
    let compressed = dir.path().join("sample.lzw");
    let expanded = dir.path().join("sample.out");

    for coding in ["gamma", "delta", "omega", "fib"] {
        let mut cmd = Command::cargo_bin("retrocompressor")?;
        cmd.arg("lzw")
            .arg("code")
            .arg("-i").arg(&input)
            .arg("-o").arg(&compressed)
            .arg("-c").arg(coding)
            .assert()
            .success();

        let mut cmd = Command::cargo_bin("retrocompressor")?;
        cmd.arg("lzw")
            .arg("decode")
            .arg("-i").arg(&compressed)
            .arg("-o").arg(&expanded)
            .arg("-c").arg(coding)
            .assert()
            .success();

        assert_eq!(std::fs::read(&expanded)?, sample_text(), "coding={coding}");
    }
    Ok(())
}

#[test]
fn lzw_fast_speed_round_trips() -> STDRESULT {
    let dir = tempfile::tempdir()?;
    let input = write_fixture(dir.path(), "sample.txt", &sample_text());
    let compressed = dir.path().join("sample.lzw");
    let expanded = dir.path().join("sample.out");

    let mut cmd = Command::cargo_bin("retrocompressor")?;
    cmd.arg("lzw")
        .arg("code")
        .arg("-i").arg(&input)
        .arg("-o").arg(&compressed)
        .arg("--speed").arg("fast")
        .assert()
        .success();

    let mut cmd = Command::cargo_bin("retrocompressor")?;
    cmd.arg("lzw")
        .arg("decode")
        .arg("-i").arg(&compressed)
        .arg("-o").arg(&expanded)
        .arg("--speed").arg("fast")
        .assert()
        .success();

    assert_eq!(std::fs::read(&expanded)?, sample_text());
    Ok(())
}

#[test]
fn lbg_quantizes_a_small_tga() -> STDRESULT {
    let dir = tempfile::tempdir()?;
    let input = dir.path().join("in.tga");
    let output = dir.path().join("out.tga");

    let mut pixels = Vec::new();
    for i in 0..64u32 {
        pixels.push(((i * 4) as u8, (i * 2) as u8, (i * 3) as u8));
    }
    write_tga(&input, 8, 8, &pixels);

    let mut cmd = Command::cargo_bin("retrocompressor")?;
    cmd.arg("lbg")
        .arg("-i").arg(&input)
        .arg("-o").arg(&output)
        .arg("-k").arg("2")
        .assert()
        .success();

    let out_data = std::fs::read(&output)?;
    let in_data = std::fs::read(&input)?;
    assert_eq!(&out_data[..18], &in_data[..18]);
    assert_eq!(out_data.len(), in_data.len());
    Ok(())
}

#[test]
fn lbg_rejects_identical_input_and_output_paths() -> STDRESULT {
    let dir = tempfile::tempdir()?;
    let input = dir.path().join("in.tga");
    write_tga(&input, 1, 1, &[(1, 2, 3)]);

    let mut cmd = Command::cargo_bin("retrocompressor")?;
    cmd.arg("lbg")
        .arg("-i").arg(&input)
        .arg("-o").arg(&input)
        .arg("-k").arg("0")
        .assert()
        .failure();
    Ok(())
}

#[test]
fn lzw_code_rejects_identical_input_and_output_paths() -> STDRESULT {
    let dir = tempfile::tempdir()?;
    let path = write_fixture(dir.path(), "sample.txt", &sample_text());

    let mut cmd = Command::cargo_bin("retrocompressor")?;
    cmd.arg("lzw")
        .arg("code")
        .arg("-i").arg(&path)
        .arg("-o").arg(&path)
        .assert()
        .failure();
    Ok(())
}

#[test]
fn lbg_rejects_k_above_twenty_four() -> STDRESULT {
    let dir = tempfile::tempdir()?;
    let input = dir.path().join("in.tga");
    write_tga(&input, 1, 1, &[(1, 2, 3)]);

    let mut cmd = Command::cargo_bin("retrocompressor")?;
    cmd.arg("lbg")
        .arg("-i").arg(&input)
        .arg("-o").arg(dir.path().join("out.tga"))
        .arg("-k").arg("25")
        .assert()
        .failure();
    Ok(())
}
