use clap::{arg,crate_version,Command};
use hufflz::Codec;
use std::time::Instant;

const RCH: &str = "unreachable was reached";

/// samples for the demonstration harness, a mix of low-entropy and
/// repetitive strings that favor different codecs
const DEMO_STRINGS: [&str;8] = [
    "abcdefghqwertyfdjkbnbvsmk.bnsjk;jkfndgsjlkdbnjkdnv;aslkndfkjfl;akjsdkjfa;skdjf;klasdjf;lasjdfa;lsjdf",
    "aaaabbcddd",
    "abacabacabadaca",
    "hellolololololo",
    "aacaacabcabaaac",
    "aacaacabcabaaacaacaacabcabaaacaacaacabcabaaac",
    "abacababacabc",
    "aaaaaaaaaaaaaa"
];

fn main() -> Result<(),Box<dyn std::error::Error>>
{
    env_logger::init();
    let long_help =
"Examples:
---------
Compress:      `hufflz compress -m lz77 -i my_expanded -o my_compressed`
Expand:        `hufflz expand -m lz77 -i my_compressed -o my_expanded`
Demonstrate:   `hufflz demo my_file1 my_file2`";

    let methods = ["huffman","lz77","lz78"];

    let mut main_cmd = Command::new("hufflz")
        .about("Compress and expand with Huffman, LZ77, LZ78")
        .after_long_help(long_help)
        .version(crate_version!());
    main_cmd = main_cmd.subcommand(Command::new("compress")
        .arg(arg!(-m --method <METHOD> "compression algorithm").value_parser(methods)
            .required(true))
        .arg(arg!(-i --input <PATH> "input path").required(true))
        .arg(arg!(-o --output <PATH> "output path").required(true))
        .about("compress a file"));

    main_cmd = main_cmd.subcommand(Command::new("expand")
        .arg(arg!(-m --method <METHOD> "compression algorithm").value_parser(methods)
            .required(true))
        .arg(arg!(-i --input <PATH> "input path").required(true))
        .arg(arg!(-o --output <PATH> "output path").required(true))
        .about("expand a file"));

    main_cmd = main_cmd.subcommand(Command::new("demo")
        .arg(arg!([file] ... "files to run through every codec").required(false))
        .about("run every codec over built-in samples and optional files"));

    let matches = main_cmd.get_matches();

    if let Some(cmd) = matches.subcommand_matches("compress") {
        let path_in = cmd.get_one::<String>("input").expect(RCH);
        let path_out = cmd.get_one::<String>("output").expect(RCH);
        let method = cmd.get_one::<String>("method").expect(RCH);
        let codec = Codec::from_name(method).expect(RCH);
        let dat = std::fs::read(path_in)?;
        if dat.len() > u32::MAX as usize {
            eprintln!("{} is too large for the length frame",path_in);
            return Err(Box::new(std::fmt::Error));
        }
        let compressed = codec.compress_slice(&dat)?;
        // the codec blobs carry no length, the file format adds one
        let mut framed = (dat.len() as u32).to_le_bytes().to_vec();
        framed.extend_from_slice(&compressed);
        std::fs::write(path_out,framed)?;
    }

    if let Some(cmd) = matches.subcommand_matches("expand") {
        let path_in = cmd.get_one::<String>("input").expect(RCH);
        let path_out = cmd.get_one::<String>("output").expect(RCH);
        let method = cmd.get_one::<String>("method").expect(RCH);
        let codec = Codec::from_name(method).expect(RCH);
        let dat = std::fs::read(path_in)?;
        if dat.len() < 4 {
            eprintln!("{} is too short to hold a length frame",path_in);
            return Err(Box::new(std::fmt::Error));
        }
        let expanded_len = u32::from_le_bytes([dat[0],dat[1],dat[2],dat[3]]) as usize;
        let expanded = codec.expand_slice(&dat[4..],expanded_len)?;
        std::fs::write(path_out,expanded)?;
    }

    if let Some(cmd) = matches.subcommand_matches("demo") {
        for dat in DEMO_STRINGS {
            demo_run(dat.as_bytes());
        }
        if let Some(files) = cmd.get_many::<String>("file") {
            for path in files {
                match std::fs::read(path) {
                    Ok(dat) => {
                        demo_run(&dat);
                        println!("file: {}",path);
                    },
                    Err(e) => eprintln!("skipping {}: {}",path,e)
                }
            }
        }
    }

    Ok(())
}

/// Run every codec over one buffer and print a report.  Failures go to
/// stderr and are not fatal: the demo always completes.
fn demo_run(dat: &[u8]) {
    for codec in Codec::ALL {
        println!("{}","-".repeat(80));
        println!("codec: {}",codec.type_name());
        if dat.len() < 128 {
            println!("source: {}",String::from_utf8_lossy(dat));
        }
        println!("source size: {}",dat.len());
        let timer = Instant::now();
        let compressed = match codec.compress_slice(dat) {
            Ok(v) => v,
            Err(e) => {
                eprintln!("compress failed: {}",e);
                continue;
            }
        };
        let compress_ms = timer.elapsed().as_secs_f64()*1000.0;
        println!("compressed size: {}",compressed.len());
        if compressed.len() > 0 {
            println!("ratio: {:.3}",dat.len() as f64 / compressed.len() as f64);
        }
        let timer = Instant::now();
        let expanded = match codec.expand_slice(&compressed,dat.len()) {
            Ok(v) => v,
            Err(e) => {
                eprintln!("expand failed: {}",e);
                continue;
            }
        };
        let expand_ms = timer.elapsed().as_secs_f64()*1000.0;
        println!("expanded size: {}",expanded.len());
        println!("compress time: {:.3} ms",compress_ms);
        println!("expand time: {:.3} ms",expand_ms);
        match expanded == dat {
            true => println!("round trip: ok"),
            false => eprintln!("round trip: data corruption")
        }
    }
}
