use objgraph_core::{
    AccessError, ConfigError, ExploreConfig, Inspectable, Member, NodeColor, ObjGraphError,
    ProducerError, Value,
};
use objgraph_graph::{
    count_edges_by_label_prefix, count_edges_matching, find_to, to_paths, FindOptions, FindOutcome,
    JsonVisualizer,
};
use std::io::Write;
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

struct Spell;

impl Inspectable for Spell {
    fn type_name(&self) -> &str {
        "Spell"
    }

    fn namespace(&self) -> &str {
        "magic"
    }

    fn members(&self) -> Vec<Member> {
        vec![]
    }

    fn get(&self, name: &str) -> Result<Value, AccessError> {
        Err(AccessError::no_such_member(name))
    }
}

struct Wizard {
    name: String,
    points: AtomicI64,
    hidden_spells: Value,
    deaths: Arc<AtomicUsize>,
}

impl Wizard {
    fn new(name: &str, deaths: &Arc<AtomicUsize>) -> Self {
        Self {
            name: name.to_string(),
            points: AtomicI64::new(10),
            hidden_spells: Value::list(vec![Value::object(Spell), Value::object(Spell)]),
            deaths: deaths.clone(),
        }
    }
}

impl Inspectable for Wizard {
    fn type_name(&self) -> &str {
        "Wizard"
    }

    fn namespace(&self) -> &str {
        "magic"
    }

    fn members(&self) -> Vec<Member> {
        vec![
            Member::field("name"),
            Member::field("points"),
            Member::container("hidden_spells"),
            Member::producer("cast_spell"),
            Member::producer("die"),
        ]
    }

    fn get(&self, name: &str) -> Result<Value, AccessError> {
        match name {
            "name" => Ok(Value::str(self.name.clone())),
            "points" => Ok(Value::from(self.points.load(Ordering::SeqCst))),
            "hidden_spells" => Ok(self.hidden_spells.clone()),
            other => Err(AccessError::no_such_member(other)),
        }
    }

    fn call(&self, name: &str, out: &mut dyn Write) -> Result<Value, ProducerError> {
        match name {
            "cast_spell" => {
                self.points.fetch_sub(1, Ordering::SeqCst);
                writeln!(out, "{} casts a spell", self.name).ok();
                Ok(Value::object(Spell))
            }
            "die" => {
                self.deaths.fetch_add(1, Ordering::SeqCst);
                Err(ProducerError::new("ValueError", "A wizard never dies!"))
            }
            other => Err(ProducerError::not_a_producer("Wizard", other)),
        }
    }
}

struct Root {
    wizards: Value,
    wizards_dict: Value,
}

impl Root {
    fn new(deaths: &Arc<AtomicUsize>) -> Self {
        Self {
            wizards: Value::list(vec![
                Value::object(Wizard::new("Harry", deaths)),
                Value::object(Wizard::new("Voldemort", deaths)),
            ]),
            wizards_dict: Value::mapping(vec![(
                "wiz1",
                Value::object(Wizard::new("Unknown", deaths)),
            )]),
        }
    }
}

impl Inspectable for Root {
    fn type_name(&self) -> &str {
        "Root"
    }

    fn namespace(&self) -> &str {
        "magic"
    }

    fn members(&self) -> Vec<Member> {
        vec![Member::container("wizards"), Member::mapping("wizards_dict")]
    }

    fn get(&self, name: &str) -> Result<Value, AccessError> {
        match name {
            "wizards" => Ok(self.wizards.clone()),
            "wizards_dict" => Ok(self.wizards_dict.clone()),
            other => Err(AccessError::no_such_member(other)),
        }
    }
}

fn world() -> (Value, Arc<AtomicUsize>) {
    let deaths = Arc::new(AtomicUsize::new(0));
    (Value::object(Root::new(&deaths)), deaths)
}

fn quiet() -> FindOptions {
    FindOptions::new(ExploreConfig {
        verbose: false,
        ..ExploreConfig::default()
    })
}

fn search(root: &Value, pattern: &str) -> FindOutcome {
    find_to(root, pattern, &quiet(), &mut Vec::new()).unwrap()
}

#[test]
fn test_find_spell_keeps_four_nodes() {
    let (root, _) = world();
    let outcome = search(&root, "spell");
    assert_eq!(outcome.subgraph.node_count(), 4);
}

#[test]
fn test_find_spell_paths() {
    let (root, _) = world();
    let mut out = Vec::new();
    let options = FindOptions::new(ExploreConfig::default());
    let outcome = find_to(&root, "spell", &options, &mut out).unwrap();

    let expected = vec![
        "Root.wizards[0].hidden_spells[0] -> 'Spell'".to_string(),
        "Root.wizards[0].cast_spell() -> 'Spell'".to_string(),
    ];
    assert_eq!(outcome.paths().collect::<Vec<_>>(), expected);
    assert_eq!(String::from_utf8(out).unwrap(), format!("{}\n", expected.join("\n")));
}

#[test]
fn test_paths_are_idempotent() {
    let (root, _) = world();
    let outcome = search(&root, "spell");
    let first: Vec<String> = outcome.paths().collect();
    let second: Vec<String> = to_paths(&outcome.subgraph, outcome.exploration.root, "Root").collect();
    assert_eq!(first, second);
}

#[test]
fn test_edge_counts_on_spell_subgraph() {
    let (root, _) = world();
    let outcome = search(&root, "spell");
    assert_eq!(count_edges_by_label_prefix(&outcome.subgraph, "wizards"), 1);
    assert_eq!(count_edges_matching(&outcome.subgraph, "spell").unwrap(), 2);
    assert_eq!(count_edges_matching(&outcome.subgraph, "wizards").unwrap(), 1);
}

#[test]
fn test_root_is_retained_and_tagged() {
    let (root, _) = world();
    let outcome = search(&root, "spell");
    let root_id = outcome.exploration.root;
    assert_eq!(outcome.subgraph.root(), Some(root_id));
    assert_eq!(outcome.subgraph.node(root_id).unwrap().color, NodeColor::Root);
    assert_eq!(
        outcome.subgraph.reachable_from_root().len(),
        outcome.subgraph.node_count()
    );
}

#[test]
fn test_matches_are_tagged() {
    let (root, _) = world();
    let outcome = search(&root, "spell");
    let matches: Vec<_> = outcome
        .subgraph
        .node_ids()
        .into_iter()
        .filter(|id| outcome.subgraph.node(*id).unwrap().color == NodeColor::Match)
        .collect();
    assert_eq!(matches.len(), 2);
    for id in matches {
        assert_eq!(outcome.subgraph.node(id).unwrap().label, "Spell");
    }
}

#[test]
fn test_failing_producer_becomes_error_node() {
    let (root, deaths) = world();
    let outcome = search(&root, "spell");

    let graph = &outcome.exploration.graph;
    let errors: Vec<_> = graph
        .node_ids()
        .filter(|id| graph.value(*id).is_some_and(Value::is_error))
        .collect();
    assert_eq!(errors.len(), 1);
    let error = graph.node(errors[0]).unwrap();
    assert_eq!(error.label, "ValueError");
    assert_eq!(error.color, NodeColor::Error);
    assert!(error.preview.contains("A wizard never dies!"));
    assert_eq!(graph.parents(errors[0])[0].1.label, "die()");
    assert_eq!(deaths.load(Ordering::SeqCst), 1);
}

#[test]
fn test_error_nodes_are_searchable() {
    let (root, deaths) = world();
    let outcome = search(&root, "ValueError");
    assert_eq!(deaths.load(Ordering::SeqCst), 1);
    assert_eq!(
        outcome.paths().collect::<Vec<_>>(),
        vec!["Root.wizards[0].die() -> 'ValueError'".to_string()]
    );
}

#[test]
fn test_each_exploration_invokes_again() {
    let (root, deaths) = world();
    search(&root, "spell");
    search(&root, "spell");
    assert_eq!(deaths.load(Ordering::SeqCst), 2);
}

#[test]
fn test_ignore_pattern_skips_producer() {
    let (root, deaths) = world();
    let options = FindOptions::new(ExploreConfig {
        verbose: false,
        ignore_pattern: vec!["^die$".to_string()],
        ..ExploreConfig::default()
    });
    let outcome = find_to(&root, "spell", &options, &mut Vec::new()).unwrap();
    assert_eq!(deaths.load(Ordering::SeqCst), 0);
    assert_eq!(outcome.subgraph.node_count(), 4);
}

#[test]
fn test_denied_type_is_a_leaf() {
    let (root, _) = world();
    let mut config = ExploreConfig {
        verbose: false,
        ..ExploreConfig::default()
    };
    config.ignored_types.push("Wizard".to_string());
    let outcome = find_to(&root, "spell", &FindOptions::new(config), &mut Vec::new()).unwrap();
    assert!(outcome.is_empty());
}

#[test]
fn test_no_match() {
    let (root, _) = world();
    let mut out = Vec::new();
    let options = FindOptions::new(ExploreConfig::default());
    let outcome = find_to(&root, "dragon", &options, &mut out).unwrap();
    assert!(outcome.is_empty());
    assert_eq!(outcome.paths().count(), 0);
    assert_eq!(String::from_utf8(out).unwrap(), "No match\n");
    assert!(outcome.exploration.graph.node_count() > 1);
}

#[test]
fn test_empty_pattern_matches_nothing() {
    let (root, _) = world();
    assert!(search(&root, "").is_empty());
}

#[test]
fn test_pattern_excluded_by_ignore_rule() {
    let (root, _) = world();
    let options = FindOptions::new(ExploreConfig {
        ignore_pattern: vec!["spell".to_string()],
        ..ExploreConfig::default()
    });
    let err = find_to(&root, "spell", &options, &mut Vec::new()).unwrap_err();
    assert!(matches!(
        err,
        ObjGraphError::Config(ConfigError::ExcludedPattern { .. })
    ));
}

#[test]
fn test_visualize_writes_artifact() {
    let (root, _) = world();
    let dir = TempDir::new().unwrap();
    let options = FindOptions::new(ExploreConfig {
        verbose: false,
        visualize: true,
        ..ExploreConfig::default()
    })
    .with_visualizer(JsonVisualizer::new(dir.path()));

    let outcome = find_to(&root, "spell", &options, &mut Vec::new()).unwrap();
    let artifact = outcome.artifact.unwrap();
    assert_eq!(artifact, dir.path().join("Root.json"));
    assert!(artifact.exists());
}

#[test]
fn test_visualize_skips_empty_result() {
    let (root, _) = world();
    let dir = TempDir::new().unwrap();
    let options = FindOptions::new(ExploreConfig {
        verbose: false,
        visualize: true,
        output_dir: dir.path().to_path_buf(),
        ..ExploreConfig::default()
    });
    let outcome = find_to(&root, "dragon", &options, &mut Vec::new()).unwrap();
    assert!(outcome.artifact.is_none());
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

struct Hero {
    drops: AtomicUsize,
}

impl Inspectable for Hero {
    fn type_name(&self) -> &str {
        "Hero"
    }

    fn namespace(&self) -> &str {
        "guild"
    }

    fn members(&self) -> Vec<Member> {
        vec![
            Member::container("skills"),
            Member::field("nuclear_codes"),
            Member::producer("drop_table"),
        ]
    }

    fn get(&self, name: &str) -> Result<Value, AccessError> {
        match name {
            "skills" => Ok(Value::list(vec![Value::str("archery")])),
            "nuclear_codes" => Ok(Value::from(1234i64)),
            other => Err(AccessError::no_such_member(other)),
        }
    }

    fn call(&self, name: &str, _out: &mut dyn Write) -> Result<Value, ProducerError> {
        self.drops.fetch_add(1, Ordering::SeqCst);
        Err(ProducerError::not_a_producer("Hero", name))
    }
}

#[test]
fn test_reserved_words_only_block_whole_segments() {
    let hero = Arc::new(Hero {
        drops: AtomicUsize::new(0),
    });
    let root = Value::from(hero.clone());

    let outcome = search(&root, "skill");
    assert_eq!(
        outcome.paths().collect::<Vec<_>>(),
        vec!["Hero.skills[0] -> 'String'".to_string()]
    );

    let outcome = search(&root, "String|i64");
    assert_eq!(
        outcome.paths().collect::<Vec<_>>(),
        vec![
            "Hero.skills[0] -> 'String'".to_string(),
            "Hero.nuclear_codes -> 'i64'".to_string(),
        ]
    );
    assert_eq!(hero.drops.load(Ordering::SeqCst), 0);
}
