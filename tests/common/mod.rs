//! Fixture databases for integration tests
//!
//! `IpdbWriter` assembles small `.ipdb` files in memory: a trie built from
//! CIDR inserts (IPv4 networks go under `::ffff:0:0/96`), a data region with
//! one leading padding byte, and a JSON header.

#![allow(dead_code)]

use serde_json::json;
use std::io::Write;
use std::net::IpAddr;
use std::path::Path;
use tempfile::NamedTempFile;

#[derive(Debug, Clone, Copy)]
enum Child {
    Empty,
    Node(u32),
    Record(usize),
}

pub struct IpdbWriter {
    fields: Vec<String>,
    languages: Vec<String>,
    ip_version: u16,
    build: i64,
    nodes: Vec<[Child; 2]>,
    records: Vec<String>,
}

impl IpdbWriter {
    /// `languages` are numbered by position: the first is column block 0.
    pub fn new(fields: &[&str], languages: &[&str]) -> Self {
        IpdbWriter {
            fields: fields.iter().map(|s| s.to_string()).collect(),
            languages: languages.iter().map(|s| s.to_string()).collect(),
            ip_version: 0x01 | 0x02,
            build: 1_700_000_000,
            nodes: vec![[Child::Empty, Child::Empty]],
            records: Vec::new(),
        }
    }

    pub fn ip_version(mut self, flags: u16) -> Self {
        self.ip_version = flags;
        self
    }

    pub fn build_timestamp(mut self, build: i64) -> Self {
        self.build = build;
        self
    }

    /// Map `cidr` to a record made of `columns` joined by tabs.
    pub fn insert(&mut self, cidr: &str, columns: &[&str]) -> &mut Self {
        let (addr, prefix) = cidr.split_once('/').expect("cidr needs a prefix");
        let addr: IpAddr = addr.parse().expect("bad network address");
        let prefix: usize = prefix.parse().expect("bad prefix length");

        let (bits, len) = match addr {
            IpAddr::V4(v4) => (v4.to_ipv6_mapped().octets(), 96 + prefix),
            IpAddr::V6(v6) => (v6.octets(), prefix),
        };
        assert!(len > 0, "catch-all roots are built by hand");

        self.records.push(columns.join("\t"));
        let record = self.records.len() - 1;

        let mut node = 0usize;
        for i in 0..len {
            let bit = ((bits[i >> 3] >> (7 - (i & 7))) & 1) as usize;
            if i == len - 1 {
                self.nodes[node][bit] = Child::Record(record);
                break;
            }
            node = match self.nodes[node][bit] {
                Child::Node(next) => next as usize,
                Child::Empty => {
                    self.nodes.push([Child::Empty, Child::Empty]);
                    let next = self.nodes.len() - 1;
                    self.nodes[node][bit] = Child::Node(next as u32);
                    next
                }
                Child::Record(_) => panic!("{} overlaps an existing network", cidr),
            };
        }
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let node_count = self.nodes.len() as u32;

        // A leading pad byte keeps every record reference above node_count
        let mut region = vec![0u8];
        let mut offsets = Vec::with_capacity(self.records.len());
        for record in &self.records {
            offsets.push(region.len() as u32);
            region.extend_from_slice(&(record.len() as u16).to_be_bytes());
            region.extend_from_slice(record.as_bytes());
        }

        let mut tree = Vec::with_capacity(self.nodes.len() * 8);
        for node in &self.nodes {
            for child in node {
                let reference = match *child {
                    Child::Empty => node_count,
                    Child::Node(n) => n,
                    Child::Record(r) => node_count + offsets[r],
                };
                tree.extend_from_slice(&reference.to_be_bytes());
            }
        }

        let languages: serde_json::Map<String, serde_json::Value> = self
            .languages
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), json!(i)))
            .collect();
        let meta = json!({
            "build": self.build,
            "ip_version": self.ip_version,
            "languages": languages,
            "node_count": node_count,
            "total_size": tree.len() + region.len(),
            "fields": self.fields,
        });

        assemble(&serde_json::to_vec(&meta).unwrap(), &tree, &region)
    }

    pub fn write_temp(&self) -> NamedTempFile {
        write_temp(&self.build())
    }
}

/// Prefix `meta_json` with its length and append the body.
pub fn assemble(meta_json: &[u8], tree: &[u8], region: &[u8]) -> Vec<u8> {
    let mut data = (meta_json.len() as u32).to_be_bytes().to_vec();
    data.extend_from_slice(meta_json);
    data.extend_from_slice(tree);
    data.extend_from_slice(region);
    data
}

/// One node whose children both reference a single "US" record.
pub fn catch_all_db() -> Vec<u8> {
    assemble(
        br#"{"languages":{"EN":0},"node_count":1,"fields":["country"]}"#,
        &[0x00, 0x00, 0x00, 0x02, 0x00, 0x00, 0x00, 0x02],
        &[0x00, 0x00, 0x02, b'U', b'S'],
    )
}

/// Same shape as `catch_all_db` with a different country.
pub fn catch_all_db_with(country: &str) -> Vec<u8> {
    let mut region = vec![0x00];
    region.extend_from_slice(&(country.len() as u16).to_be_bytes());
    region.extend_from_slice(country.as_bytes());
    assemble(
        br#"{"languages":{"EN":0},"node_count":1,"fields":["country"]}"#,
        &[0x00, 0x00, 0x00, 0x02, 0x00, 0x00, 0x00, 0x02],
        &region,
    )
}

/// Two-language city database with IPv4 and IPv6 networks.
pub fn city_db() -> IpdbWriter {
    let mut writer = IpdbWriter::new(&["country_name", "region_name", "city_name"], &["CN", "EN"]);
    writer
        .insert(
            "114.114.114.0/24",
            &["中国", "江苏", "南京", "China", "Jiangsu", "Nanjing"],
        )
        .insert(
            "8.8.8.0/24",
            &["美国", "", "", "United States", "", ""],
        )
        .insert(
            "2001:4860::/32",
            &["美国", "加利福尼亚州", "山景城", "United States", "California", "Mountain View"],
        );
    writer
}

pub fn write_temp(data: &[u8]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(data).unwrap();
    file.flush().unwrap();
    file
}

pub fn overwrite(path: &Path, data: &[u8]) {
    std::fs::write(path, data).unwrap();
}
