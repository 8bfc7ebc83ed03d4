use contextgraph_core::{
    EdgeKind, ExtractionConfig, FileClass, ImportKind, RelationKind, Visibility,
};
use contextgraph_parser::SourceModelExtractor;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write(root: &Path, rel: &str, body: &[u8]) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, body).unwrap();
}

fn fixture() -> TempDir {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    write(root, "tsconfig.json", b"{ \"compilerOptions\": {} }");
    write(
        root,
        "src/models/user.ts",
        br#"
import { Post } from './post';

/** Somebody with an account. */
export interface User {
    id: string;
    email?: string;
    posts: OneToMany<Post>;
}
"#,
    );
    write(
        root,
        "src/models/post.ts",
        br#"
import type { User } from './user';

export class Post {
    id!: number;
    author: ManyToOne<User>;
}
"#,
    );
    write(
        root,
        "src/services/user.service.ts",
        br#"
import { Injectable } from '@nestjs/common';
import { User } from '../models/user';
import { Repository } from '../lib/repository';

@Injectable()
export class UserService {
    constructor(private readonly users: Repository<User>) {}

    async find(id: string): Promise<User | undefined> {
        for (const u of await this.users.all()) {
            if (u.id === id) {
                return u;
            }
        }
        return undefined;
    }

    private audit(): void {}
}
"#,
    );
    write(
        root,
        "src/services/user.service.spec.ts",
        b"import { UserService } from './user.service';\n",
    );
    write(
        root,
        "src/lib/repository.ts",
        b"export class Repository<T> { all(): T[] { return []; } }\n",
    );
    write(root, "src/lib/index.ts", b"export * from './repository';\n");
    write(root, "src/config/app.config.ts", b"export const port = 3000;\n");
    write(root, "src/types/global.d.ts", b"declare const x: number;\n");
    write(root, "node_modules/pkg/index.ts", b"export const vendored = 1;\n");
    write(
        root,
        "coverage/coverage-summary.json",
        br#"{
            "total": { "statements": { "pct": 70 } },
            "src/services/user.service.ts": { "statements": { "pct": 87.5 } }
        }"#,
    );
    dir
}

fn extract(root: &Path) -> contextgraph_core::SourceModel {
    SourceModelExtractor::new(ExtractionConfig::default())
        .extract(root)
        .unwrap()
}

#[test]
fn collects_files_and_classifies_them() {
    let dir = fixture();
    let model = extract(dir.path());

    let classes: Vec<(&str, FileClass)> = model
        .files
        .iter()
        .map(|f| (f.id.as_str(), f.file_class))
        .collect();
    assert_eq!(
        classes,
        vec![
            ("src/config/app.config.ts", FileClass::Config),
            ("src/lib/index.ts", FileClass::Util),
            ("src/lib/repository.ts", FileClass::Util),
            ("src/models/post.ts", FileClass::Entity),
            ("src/models/user.ts", FileClass::Entity),
            ("src/services/user.service.spec.ts", FileClass::Test),
            ("src/services/user.service.ts", FileClass::Service),
        ]
    );
}

#[test]
fn extracts_entities_with_relations() {
    let dir = fixture();
    let model = extract(dir.path());

    let names: Vec<&str> = model.entities.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["Post", "User"]);

    let user = model.entities.iter().find(|e| e.name == "User").unwrap();
    assert_eq!(user.file, "src/models/user.ts");
    assert_eq!(user.doc.as_deref(), Some("Somebody with an account."));
    assert_eq!(user.relations.len(), 1);
    assert_eq!(user.relations[0].kind, RelationKind::OneToMany);
    assert_eq!(user.relations[0].target, "Post");

    let post = model.entities.iter().find(|e| e.name == "Post").unwrap();
    assert_eq!(post.relations[0].kind, RelationKind::ManyToOne);
    assert_eq!(post.relations[0].target, "User");
}

#[test]
fn extracts_services_with_tests_and_coverage() {
    let dir = fixture();
    let model = extract(dir.path());

    assert_eq!(model.services.len(), 1);
    let service = &model.services[0];
    assert_eq!(service.name, "UserService");
    assert_eq!(service.dependencies[0].service, "Repository");
    assert!(!service.dependencies[0].optional);
    assert!(service.metadata.has_tests);
    assert_eq!(service.metadata.metrics.coverage, 87.5);
    assert_eq!(service.metadata.metrics.dependency_count, 1);
    // class body: one for-of and one if
    assert_eq!(service.metadata.metrics.complexity, 3);

    let names: Vec<&str> = service.methods.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, vec!["find", "audit"]);
    assert_eq!(service.method("audit").unwrap().visibility, Visibility::Private);
    assert_eq!(
        service.method("find").unwrap().return_type,
        "Promise<User | undefined>"
    );
}

#[test]
fn resolves_relative_imports_and_keeps_packages_opaque() {
    let dir = fixture();
    let model = extract(dir.path());

    let service = model
        .files
        .iter()
        .find(|f| f.id == "src/services/user.service.ts")
        .unwrap();
    let targets: Vec<&str> = service
        .dependencies
        .iter()
        .map(|d| d.target.as_str())
        .collect();
    assert_eq!(
        targets,
        vec!["@nestjs/common", "src/models/user.ts", "src/lib/repository.ts"]
    );

    let post = model.files.iter().find(|f| f.id == "src/models/post.ts").unwrap();
    assert_eq!(post.imports[0].kind, ImportKind::Type);
    assert_eq!(post.dependencies[0].target, "src/models/user.ts");
    assert_eq!(post.dependencies[0].kind, EdgeKind::Use);

    let index = model.files.iter().find(|f| f.id == "src/lib/index.ts").unwrap();
    assert_eq!(index.dependencies[0].target, "src/lib/repository.ts");
}

#[test]
fn unreadable_file_is_kept_with_zero_metrics() {
    let dir = fixture();
    write(dir.path(), "src/lib/broken.ts", &[0xff, 0xfe, 0x00, 0x61]);
    let model = extract(dir.path());

    let broken = model
        .files
        .iter()
        .find(|f| f.id == "src/lib/broken.ts")
        .unwrap();
    assert_eq!(broken.size, 0);
    assert_eq!(broken.complexity, 0);
    assert!(broken.dependencies.is_empty());
    assert_eq!(model.services.len(), 1);
}

#[test]
fn repeated_extraction_is_identical() {
    let dir = fixture();
    let first = extract(dir.path());
    let second = extract(dir.path());
    assert_eq!(first.files, second.files);
    assert_eq!(first.entities, second.entities);
    assert_eq!(first.services, second.services);
}

#[test]
fn exported_decorated_entity_keeps_one_annotation_per_decorator() {
    let dir = fixture();
    write(
        dir.path(),
        "src/models/order.ts",
        b"@Entity('orders')\nexport class Order { id: number; }\n",
    );
    let model = extract(dir.path());

    let order = model.entities.iter().find(|e| e.name == "Order").unwrap();
    assert_eq!(order.metadata.annotations.len(), 1);
    assert_eq!(order.metadata.annotations[0].name, "Entity");
    assert_eq!(
        order.metadata.annotations[0].arguments,
        vec![serde_json::json!("orders")]
    );
}
