use clap::{arg, crate_version, Command};
use rand::rngs::OsRng;

use retrocompressor::lzw::{Coding, Speed};
use retrocompressor::{ac, lbg, lzw, STDRESULT};

const RCH: &str = "unreachable was reached";

fn main() -> STDRESULT {
    env_logger::init();

    let long_help = "Examples:
---------
AC self-check: `retrocompressor ac-demo`
LZW compress:  `retrocompressor lzw code -i my_file -o my_file.lzw -c omega --speed slow`
LZW expand:    `retrocompressor lzw decode -i my_file.lzw -o my_file -c omega --speed slow`
LBG quantize:  `retrocompressor lbg -i my_image.tga -o my_quantized.tga -k 8`";

    let codings = ["gamma", "delta", "omega", "fib"];
    let speeds = ["slow", "fast"];

    let mut main_cmd = Command::new("retrocompressor")
        .about("Compress and expand with retro formats")
        .after_long_help(long_help)
        .version(crate_version!());

    main_cmd = main_cmd.subcommand(
        Command::new("ac-demo")
            .arg(arg!(-i --input <PATH> "optional file to self-check instead of the built-in demo pattern").required(false))
            .about("encode a literal demo pattern (or an input file) with the adaptive arithmetic coder, decode it, and check equality"),
    );

    let lzw_code = Command::new("code")
        .arg(arg!(-i --input <PATH> "input path").required(true))
        .arg(arg!(-o --output <PATH> "output path").required(true))
        .arg(arg!(-c --coding <CODING> "universal integer code").value_parser(codings).default_value("omega"))
        .arg(arg!(--speed <SPEED> "dictionary hash/capacity strategy").value_parser(speeds).default_value("slow"))
        .about("compress a file with LZW");
    let lzw_decode = Command::new("decode")
        .arg(arg!(-i --input <PATH> "input path").required(true))
        .arg(arg!(-o --output <PATH> "output path").required(true))
        .arg(arg!(-c --coding <CODING> "universal integer code").value_parser(codings).default_value("omega"))
        .arg(arg!(--speed <SPEED> "dictionary hash/capacity strategy").value_parser(speeds).default_value("slow"))
        .about("expand a file compressed with LZW");
    main_cmd = main_cmd.subcommand(
        Command::new("lzw")
            .about("LZW dictionary compression")
            .subcommand(lzw_code)
            .subcommand(lzw_decode),
    );

    main_cmd = main_cmd.subcommand(
        Command::new("lbg")
            .arg(arg!(-i --input <PATH> "input 24-bit uncompressed TGA path").required(true))
            .arg(arg!(-o --output <PATH> "output TGA path").required(true))
            .arg(arg!(-k --bits <BITS> "codebook size as 2^k entries, 0..=24").value_parser(clap::value_parser!(u32)).required(true))
            .arg(arg!(-e --epsilon <EPS> "inner-loop convergence threshold").value_parser(clap::value_parser!(f64)).default_value("0.1"))
            .about("quantize a 24-bit TGA image with Linde-Buzo-Gray vector quantization"),
    );

    let matches = main_cmd.get_matches();

    if let Some(cmd) = matches.subcommand_matches("ac-demo") {
        let data = match cmd.get_one::<String>("input") {
            Some(path) => std::fs::read(path)?,
            None => b"The quick brown fox jumps over the lazy dog. ".repeat(20),
        };
        ac::self_check(&data)?;
        println!("AC self-check ok: {} bytes", data.len());
    }

    if let Some(cmd) = matches.subcommand_matches("lzw") {
        if let Some(cmd) = cmd.subcommand_matches("code") {
            let path_in = cmd.get_one::<String>("input").expect(RCH);
            let path_out = cmd.get_one::<String>("output").expect(RCH);
            if path_in == path_out {
                return Err(Box::new(retrocompressor::Error::ArgumentError));
            }
            let coding = Coding::from_name(cmd.get_one::<String>("coding").expect(RCH)).expect(RCH);
            let speed = Speed::from_name(cmd.get_one::<String>("speed").expect(RCH)).expect(RCH);
            let settings = lzw::Settings { base_size: lzw::DEFAULT_BASE_SIZE, speed, coding };

            let data = std::fs::read(path_in)?;
            let compressed = lzw::compress(&data, &settings);
            let bytes = compressed.to_bytes();

            let report = lzw::entropy::report(&data, &bytes);
            log::info!(
                "lzw code: {} -> {} bytes ({:.3} bits/byte, CR={:.3}, H_in={:.3}, H_out={:.3})",
                report.uncompressed_size,
                report.compressed_size,
                report.avg_codeword_bits,
                report.compression_ratio,
                report.uncompressed_entropy,
                report.compressed_entropy
            );

            std::fs::write(path_out, bytes)?;
        }

        if let Some(cmd) = cmd.subcommand_matches("decode") {
            let path_in = cmd.get_one::<String>("input").expect(RCH);
            let path_out = cmd.get_one::<String>("output").expect(RCH);
            if path_in == path_out {
                return Err(Box::new(retrocompressor::Error::ArgumentError));
            }
            let coding = Coding::from_name(cmd.get_one::<String>("coding").expect(RCH)).expect(RCH);
            let speed = Speed::from_name(cmd.get_one::<String>("speed").expect(RCH)).expect(RCH);
            let settings = lzw::Settings { base_size: lzw::DEFAULT_BASE_SIZE, speed, coding };

            let bytes = std::fs::read(path_in)?;
            let bits = bit_vec::BitVec::from_bytes(&bytes);
            let expanded = lzw::expand(&bits, &settings);
            std::fs::write(path_out, expanded)?;
        }
    }

    if let Some(cmd) = matches.subcommand_matches("lbg") {
        let path_in = cmd.get_one::<String>("input").expect(RCH);
        let path_out = cmd.get_one::<String>("output").expect(RCH);
        let k = *cmd.get_one::<u32>("bits").expect(RCH);
        let epsilon = *cmd.get_one::<f64>("epsilon").expect(RCH);
        if path_in == path_out {
            return Err(Box::new(retrocompressor::Error::ArgumentError));
        }

        let report = lbg::tga::quantize_file(
            std::path::Path::new(path_in),
            std::path::Path::new(path_out),
            k,
            epsilon,
            &mut OsRng,
        )?;
        log::info!(
            "lbg: {} unique colors -> {} codewords, MSE={:.4}, SNR={:.4}, SNR(dB)={:.4}",
            report.unique_colors,
            report.codebook_size,
            report.mse,
            report.snr,
            report.snr_db
        );
    }

    Ok(())
}
