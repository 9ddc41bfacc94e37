//! Shared fixtures for proteomap integration tests
//!
//! The insulin-receptor fixture: one accession (P06213) with three
//! proteoforms of different modification states, insulin (P01308) with no
//! measured peptides, two nested complexes and one reaction.

#![allow(dead_code)]

use proteomap::{
    relationship, Edge, EntityKind, GraphEngine, GraphId, MappingConfig, Node, NodeId, PathwayGraph,
    PeptideRecord, ReferenceSequences,
};

pub const GRAPH: &str = "insulin-signalling";
pub const EXPERIMENT: &str = "exp1";

pub const ACC_INSR: &str = "acc:P06213";
pub const ACC_INS: &str = "acc:P01308";
/// Unmodified receptor fragment
pub const PF_UNMODIFIED: &str = "pf:INSR(763-1382)";
/// Y1158/Y1162/Y1163 phosphorylated
pub const PF_TRIPLE: &str = "pf:phospho-p-3-INSR(400-1382)";
/// Y1162/Y1163 phosphorylated
pub const PF_DOUBLE: &str = "pf:phospho-p-2-INSR(28-1382)";
/// Insulin, never measured
pub const PF_INSULIN: &str = "pf:4xHC-INS(90-110)";
/// {PF_TRIPLE, PF_INSULIN}
pub const CX_RECEPTOR: &str = "cx:INSR:INS";
/// {CX_RECEPTOR, PF_DOUBLE}
pub const CX_SIGNALLING: &str = "cx:INSR:INS:p-2-INSR";
pub const RXN_AUTOPHOSPHORYLATION: &str = "rxn:autophosphorylation";

pub const INSR_LENGTH: usize = 1382;

pub const INSULIN_SEQUENCE: &str = concat!(
    "MALWMRLLPLLALLALWGPDPAAAFVNQHLCGSHLVEALYLVCGERGFFYTPKTRREAED",
    "LQVGQVELGGGPGAGSLQPLALEGSLQKRGIVEQCCTSICSLYQLENYCN",
);

/// Measurements for one experiment; the last row cannot be localized
pub const PEPTIDE_TABLE: &str = "\
Protein\tModified sequence\tRatio\tExperiment
P06213\tGLLPVR\t9.3\texp1
P06213\t_(ac)LGQGSFGM(ox)VYEGNAR_\t16.5\texp1
P06213\t_DIY(ph)ETDY(ph)Y(ph)RK_\t4.2\texp1
P06213\tDIpYETDpYpYRK\t5.4\texp1
P06213\t_DIY(ph)ETD_\t8.7\texp1
P06213\tPEPTIDEK\t30.0\texp1
";

/// Receptor sequence: glycine background with the two measured regions
///
/// LGQGSFGMVYEGNAR starts at 1000; DIYETDYYRK starts at 1156, which puts
/// the activation-loop tyrosines at 1158, 1162 and 1163.
pub fn insr_sequence() -> String {
    let mut residues = vec![b'G'; INSR_LENGTH];
    for (start, motif) in [(1000usize, "LGQGSFGMVYEGNAR"), (1156, "DIYETDYYRKGGKGLLPVRWMAPE")] {
        residues[start - 1..start - 1 + motif.len()].copy_from_slice(motif.as_bytes());
    }
    String::from_utf8(residues).unwrap()
}

pub fn insr_references() -> ReferenceSequences {
    let mut refs = ReferenceSequences::new();
    refs.insert("P06213", &insr_sequence());
    refs.insert("P01308", INSULIN_SEQUENCE);
    refs
}

/// The same references as a UniProt-style FASTA file body
pub fn insr_fasta() -> String {
    let mut fasta = String::from(">sp|P06213|INSR_HUMAN Insulin receptor OS=Homo sapiens\n");
    for chunk in insr_sequence().as_bytes().chunks(60) {
        fasta.push_str(std::str::from_utf8(chunk).unwrap());
        fasta.push('\n');
    }
    fasta.push_str(">sp|P01308|INS_HUMAN Insulin OS=Homo sapiens\n");
    fasta.push_str(INSULIN_SEQUENCE);
    fasta.push('\n');
    fasta
}

pub fn insr_records() -> Vec<PeptideRecord> {
    proteomap::mapping::read_measurements(PEPTIDE_TABLE.as_bytes(), &MappingConfig::default())
        .unwrap()
}

fn site(graph: &mut PathwayGraph, proteoform: &str, position: i64) {
    let id = format!("site:{}:Y{}", proteoform, position);
    graph.add_node(
        Node::with_id(id.as_str(), EntityKind::ModificationSite)
            .with_property("residue", "Y")
            .with_property("position", position),
    );
    graph.add_edge(Edge::new(
        NodeId::from(proteoform),
        NodeId::from(id),
        relationship::HAS_MODIFICATION,
    ));
}

fn link(graph: &mut PathwayGraph, source: &str, target: &str, rel: &str) {
    graph.add_edge(Edge::new(NodeId::from(source), NodeId::from(target), rel));
}

pub fn insr_graph() -> PathwayGraph {
    let mut graph = PathwayGraph::new(GRAPH).with_description("Insulin receptor activation");

    graph.add_node(
        Node::with_id(ACC_INSR, EntityKind::Accession)
            .with_property("accession", "P06213")
            .with_property("status", "current"),
    );
    graph.add_node(
        Node::with_id(ACC_INS, EntityKind::Accession)
            .with_property("accession", "P01308")
            .with_property("status", "current"),
    );

    for (id, name) in [
        (PF_UNMODIFIED, "INSR(763-1382)"),
        (PF_TRIPLE, "phospho-p-3-INSR(400-1382)"),
        (PF_DOUBLE, "phospho-p-2-INSR(28-1382)"),
        (PF_INSULIN, "4xHC-INS(90-110)"),
    ] {
        graph.add_node(Node::with_id(id, EntityKind::Proteoform).with_property("name", name));
    }
    for position in [1158, 1162, 1163] {
        site(&mut graph, PF_TRIPLE, position);
    }
    for position in [1162, 1163] {
        site(&mut graph, PF_DOUBLE, position);
    }

    link(&mut graph, ACC_INSR, PF_UNMODIFIED, relationship::BELONGS_TO);
    link(&mut graph, ACC_INSR, PF_TRIPLE, relationship::BELONGS_TO);
    link(&mut graph, ACC_INSR, PF_DOUBLE, relationship::BELONGS_TO);
    link(&mut graph, ACC_INS, PF_INSULIN, relationship::BELONGS_TO);

    for (id, name) in [(CX_RECEPTOR, "INSR:INS"), (CX_SIGNALLING, "INSR:INS:p-2-INSR")] {
        graph.add_node(Node::with_id(id, EntityKind::Complex).with_property("name", name));
    }
    link(&mut graph, CX_RECEPTOR, PF_TRIPLE, relationship::COMPONENT);
    link(&mut graph, CX_RECEPTOR, PF_INSULIN, relationship::COMPONENT);
    link(&mut graph, CX_SIGNALLING, CX_RECEPTOR, relationship::COMPONENT);
    link(&mut graph, CX_SIGNALLING, PF_DOUBLE, relationship::COMPONENT);

    graph.add_node(
        Node::with_id(RXN_AUTOPHOSPHORYLATION, EntityKind::Reaction)
            .with_property("name", "INSR autophosphorylation"),
    );
    link(&mut graph, PF_UNMODIFIED, RXN_AUTOPHOSPHORYLATION, relationship::INPUT);
    link(&mut graph, RXN_AUTOPHOSPHORYLATION, PF_TRIPLE, relationship::OUTPUT);

    graph
}

/// In-memory engine holding the fixture graph
pub fn insr_engine() -> (GraphEngine, GraphId) {
    let engine = GraphEngine::new();
    let id = engine.upsert_graph(insr_graph()).unwrap();
    (engine, id)
}

pub fn node<'a>(graph: &'a PathwayGraph, id: &str) -> &'a Node {
    graph.get_node(&NodeId::from(id)).unwrap()
}

/// (WEIGHT_SUPPORT, WEIGHT_ABUNDANCE) of the edge source -> target
pub fn edge_weights(
    graph: &PathwayGraph,
    source: &str,
    target: &str,
    experiment: &str,
) -> (f64, f64) {
    let edge = graph
        .edges()
        .find(|e| e.source.as_str() == source && e.target.as_str() == target)
        .unwrap();
    (
        edge.float(&format!("WEIGHT_SUPPORT_{}", experiment)).unwrap(),
        edge.float(&format!("WEIGHT_ABUNDANCE_{}", experiment)).unwrap(),
    )
}

pub fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {}, got {}",
        expected,
        actual
    );
}
