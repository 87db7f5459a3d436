// Shared fixture: a small trail snapshot written to a temp CSV
//
// Layout mirrors the production export: index column first, extra
// url column at the end.

use std::io::Write;
use tempfile::NamedTempFile;

pub const TRAILS_CSV: &str = "\
id,name,region,type,time_h,length_km,totalAscent,trackElevation,lat,lng,url
0,Lake Matheson Walk,West Coast,Loop,1.5,4.4,60,\"[20.0, 35.5, 40.0]\",-43.44,169.96,https://example.org/1
1,Roys Peak Track,Otago,Return,6.0,16.0,1258,\"[320.0, 900.0, 1578.0]\",-44.64,169.06,https://example.org/2
2,Blue Lake Track,Nelson Tasman,Return,2.0,8.0,150,,-41.99,172.65,https://example.org/3
3,Lake Marian Track,Southland,Return,3.25,6.0,400,,-44.79,168.11,https://example.org/4
4,Mount Fyffe Track,Canterbury,Return,7.5,16.2,1450,,-42.33,173.62,https://example.org/5
5,Blue Lake Track,Otago,Loop,0.5,1.0,10,,,,https://example.org/6
6,Hooker Valley Track,Canterbury,Return,2.999,10.0,120,,-43.72,170.09,https://example.org/7
";

pub fn write_trails_csv() -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(TRAILS_CSV.as_bytes())
        .expect("Failed to write fixture");
    file.flush().expect("Failed to flush fixture");
    file
}
